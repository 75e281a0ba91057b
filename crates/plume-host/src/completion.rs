//! Model-inference call owned by the host.

use std::future::Future;

use crate::error::CompletionError;
use crate::message::ChatMessage;

/// Host-side model call.
///
/// Pipes hand the host a list of role-tagged messages and a target model
/// identifier and get the generated text back. Extensions stay generic over
/// the backend so tests can substitute a scripted one.
pub trait CompletionBackend: Send + Sync {
    fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, CompletionError>> + Send;
}
