//! User identity and per-user settings.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity record the host attaches to every invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub role: Option<String>,

    /// Per-user settings for the invoked extension, matching its declared
    /// settings schema. Opaque here; each extension deserializes its own type.
    #[serde(default)]
    pub settings: Value,
}

impl UserRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Default::default() }
    }

    /// Deserialize the per-user settings into the extension's settings type.
    ///
    /// Absent or malformed settings fall back to the type's defaults so a
    /// broken settings record never fails the request.
    pub fn settings_or_default<T: DeserializeOwned + Default>(&self) -> T {
        if self.settings.is_null() {
            return T::default();
        }
        match serde_json::from_value(self.settings.clone()) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Malformed user settings, using defaults: {}", e);
                T::default()
            }
        }
    }
}
