//! Conversation filters and pipes for the plume extensions.
//!
//! `user_info` runs before a request reaches the model and injects a system
//! message describing the user; `vision` replaces the default model call and
//! routes image-bearing messages through a vision model first.

pub mod user_info;
pub mod vision;

pub use user_info::{UserInfoFilter, UserInfoFilterSettings, UserProfileSettings};
pub use vision::{contains_image, VisionPipe, VisionSettings};
