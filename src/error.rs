//! Error types for phpcompat

use crate::version::Version;
use thiserror::Error;

/// Main error type for phpcompat
#[derive(Debug, Error)]
pub enum CompatError {
    #[error("Invalid version format '{raw}': expected MAJOR.MINOR or MAJOR.MINOR-MAJOR.MINOR")]
    InvalidVersionFormat { raw: String },

    #[error("Invalid version range '{raw}': lower bound {low} is higher than upper bound {high}")]
    InvalidVersionRange {
        raw: String,
        low: Version,
        high: Version,
    },

    #[error("Unknown feature '{0}'")]
    UnknownFeature(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CompatError {
    /// Configuration errors stop a run before any file is scanned.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CompatError::InvalidVersionFormat { .. } | CompatError::InvalidVersionRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CompatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_format_display() {
        let err = CompatError::InvalidVersionFormat {
            raw: "7".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Invalid version format '7': expected MAJOR.MINOR or MAJOR.MINOR-MAJOR.MINOR"
        );
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_invalid_range_display() {
        let err = CompatError::InvalidVersionRange {
            raw: "8.0-7.0".to_string(),
            low: Version::new(8, 0),
            high: Version::new(7, 0),
        };
        assert_eq!(
            format!("{err}"),
            "Invalid version range '8.0-7.0': lower bound 8.0 is higher than upper bound 7.0"
        );
    }

    #[test]
    fn test_unknown_feature_is_not_configuration_error() {
        let err = CompatError::UnknownFeature("NewThing".to_string());
        assert!(!err.is_configuration_error());
        assert_eq!(format!("{err}"), "Unknown feature 'NewThing'");
    }
}
