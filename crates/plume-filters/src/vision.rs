//! Pipe: route image-bearing messages through a vision model.
//!
//! When the latest user message carries an image, the vision model describes
//! it first and the description is injected into the conversation as a
//! system message; the text model then produces the final answer.

use once_cell::sync::Lazy;
use plume_host::{ChatBody, ChatMessage, CompletionBackend};
use regex::Regex;
use serde::Deserialize;

static IMAGE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)https?://\S+\.(?:png|jpe?g|gif|webp)").expect("valid regex")
});

const IMAGE_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".gif", ".webp"];

/// Settings for the vision pipe.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    /// Model handling the final text answer.
    pub text_model: String,

    /// Model asked to describe detected images.
    pub vision_model: String,

    /// Prompt steering the vision model.
    pub vision_prompt: String,

    /// Extra tracing detail.
    pub debug: bool,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            text_model: "mistral:7b".to_string(),
            vision_model: "gemma3:4b".to_string(),
            vision_prompt: "Describe precisely what you see in this image.".to_string(),
            debug: false,
        }
    }
}

/// True when the content carries an image: an image URL, a data URI, or a
/// bare image-extension mention.
pub fn contains_image(content: &str) -> bool {
    if content.is_empty() {
        return false;
    }
    if content.contains("data:image/") {
        return true;
    }
    if IMAGE_URL.is_match(content) {
        return true;
    }
    let lower = content.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.contains(ext))
}

/// The vision pipe.
#[derive(Debug, Clone, Default)]
pub struct VisionPipe {
    settings: VisionSettings,
}

impl VisionPipe {
    pub fn new(settings: VisionSettings) -> Self {
        Self { settings }
    }

    /// Pipe entry point, replacing the default model call.
    ///
    /// Backend failures are reported as a formatted message, never as an
    /// error to the host.
    pub async fn pipe<B: CompletionBackend>(&self, mut body: ChatBody, backend: &B) -> String {
        let image_message = body
            .last_user_message()
            .filter(|m| contains_image(&m.content))
            .cloned();

        if let Some(message) = image_message {
            if self.settings.debug {
                tracing::debug!("image detected, querying the vision model");
            }
            let vision_messages =
                vec![ChatMessage::system(self.settings.vision_prompt.clone()), message];
            match backend.complete(&self.settings.vision_model, &vision_messages).await {
                Ok(description) => {
                    body.append_system_message(format!("Image analysis:\n{}", description));
                }
                Err(e) => {
                    tracing::warn!("Vision model call failed: {}", e);
                    return e.user_message().to_string();
                }
            }
        } else if self.settings.debug {
            tracing::debug!("no image detected, calling the text model directly");
        }

        match backend.complete(&self.settings.text_model, &body.messages).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Text model call failed: {}", e);
                e.user_message().to_string()
            }
        }
    }
}
