//! Request-scoped metadata supplied by the host.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Variable key under which the host exposes device-resolved coordinates,
/// formatted as "latitude, longitude".
pub const USER_LOCATION_VAR: &str = "{{USER_LOCATION}}";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestMetadata {
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

impl RequestMetadata {
    /// Device-resolved "latitude, longitude" string, when the host supplied one.
    pub fn device_location(&self) -> Option<&str> {
        self.variables
            .get(USER_LOCATION_VAR)
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_location_present() {
        let mut metadata = RequestMetadata::default();
        metadata.variables.insert(USER_LOCATION_VAR.to_string(), "45.775, 4.881".to_string());
        assert_eq!(metadata.device_location(), Some("45.775, 4.881"));
    }

    #[test]
    fn test_device_location_absent_or_blank() {
        assert!(RequestMetadata::default().device_location().is_none());

        let mut metadata = RequestMetadata::default();
        metadata.variables.insert(USER_LOCATION_VAR.to_string(), "  ".to_string());
        assert!(metadata.device_location().is_none());
    }
}
