// Typed errors with thiserror. Only the JS boundary can fail; everything past it
// recovers locally and records an Anomaly instead.

use thiserror::Error;

use crate::types::GroupId;

/// Errors surfaced to the host at the JSON boundary.
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid event batch: {0}")]
    InvalidEvents(String),

    #[error("Unknown image group {0}")]
    UnknownGroup(GroupId),

    #[error("Image group has no images")]
    EmptyGroup,

    #[error("Gallery has been destroyed")]
    Destroyed,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for GalleryError {
    fn from(err: serde_json::Error) -> Self {
        GalleryError::Serialization(err.to_string())
    }
}

/// Conditions the engine recovers from on its own. Logged, never returned to the host.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Anomaly {
    #[error("option `{option}` adjusted from {given} to {adjusted}")]
    Configuration {
        option: &'static str,
        given: String,
        adjusted: String,
    },

    #[error("group {0} had no recorded state; defaults initialized")]
    MissingGroupState(GroupId),

    #[error("image {index} of group {group} failed to load (fallback substituted: {fallback})")]
    ImageLoadFailure {
        group: GroupId,
        index: usize,
        fallback: bool,
    },

    #[error("group {0} has fewer than two rotatable images")]
    DegenerateGroup(GroupId),
}

impl Anomaly {
    /// Emit this anomaly on the `tracing` facade.
    pub fn log(&self) {
        match self {
            Anomaly::DegenerateGroup(_) => tracing::debug!(anomaly = %self, "recovered"),
            _ => tracing::warn!(anomaly = %self, "recovered"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = GalleryError::InvalidConfig("missing field".to_string());
        assert!(err.to_string().contains("missing field"));

        let err = GalleryError::UnknownGroup(GroupId::new(7));
        assert_eq!(err.to_string(), "Unknown image group #7");
    }

    #[test]
    fn serde_errors_convert() {
        let err: GalleryError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, GalleryError::Serialization(_)));
    }

    #[test]
    fn anomaly_display() {
        let anomaly = Anomaly::Configuration {
            option: "max_expansion.width",
            given: "100".into(),
            adjusted: "200".into(),
        };
        assert_eq!(
            anomaly.to_string(),
            "option `max_expansion.width` adjusted from 100 to 200"
        );
    }
}
