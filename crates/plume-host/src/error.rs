//! Error types for host collaborator calls.

use thiserror::Error;

/// Failures reported by the host's per-user memory store.
#[derive(Debug, Error)]
pub enum MemoryStoreError {
    #[error("Memory entry not found: {0}")]
    EntryNotFound(String),

    #[error("Memory store rejected the operation: {0}")]
    Rejected(String),

    #[error("Memory store unavailable: {0}")]
    Unavailable(String),
}

impl MemoryStoreError {
    /// User-friendly message suitable for a chat reply.
    pub fn user_message(&self) -> &'static str {
        match self {
            MemoryStoreError::EntryNotFound(_) => "That memory no longer exists.",
            MemoryStoreError::Rejected(_) => "The memory could not be saved.",
            MemoryStoreError::Unavailable(_) => {
                "The memory store is unavailable. Please try again."
            }
        }
    }
}

/// Failures reported by the host's model-completion call.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Model not available: {0}")]
    ModelUnavailable(String),

    #[error("Completion failed: {0}")]
    Failed(String),
}

impl CompletionError {
    pub fn user_message(&self) -> &'static str {
        match self {
            CompletionError::ModelUnavailable(_) => {
                "The requested model is unavailable. Check the configured model id."
            }
            CompletionError::Failed(_) => "The model call failed. Please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_user_messages() {
        let err = MemoryStoreError::Unavailable("down".into());
        assert!(err.user_message().contains("unavailable"));
        assert!(err.to_string().contains("down"));
    }

    #[test]
    fn test_completion_error_display() {
        let err = CompletionError::ModelUnavailable("mistral:7b".into());
        assert!(err.to_string().contains("mistral:7b"));
    }
}
