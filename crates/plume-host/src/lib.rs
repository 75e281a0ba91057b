//! Host collaborator contract for the plume extensions.
//!
//! The hosting chat platform owns the process, the conversation, the user
//! records, the per-user memory store and the model runtime. This crate
//! defines the narrow interfaces the tools and filters consume so that each
//! extension stays a self-contained request/response transform.

pub mod completion;
pub mod error;
pub mod events;
pub mod memory;
pub mod message;
pub mod metadata;
pub mod reply;
pub mod user;

pub use completion::CompletionBackend;
pub use error::{CompletionError, MemoryStoreError};
pub use events::{emit, StatusEvent, StatusSink};
pub use memory::{MemoryEntry, MemoryStore};
pub use message::{ChatBody, ChatMessage, Role};
pub use metadata::{RequestMetadata, USER_LOCATION_VAR};
pub use reply::reply;
pub use user::UserRecord;

use anyhow::Result;

/// Initialize tracing for a process embedding the extensions.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("plume host contract initialized");
    Ok(())
}
