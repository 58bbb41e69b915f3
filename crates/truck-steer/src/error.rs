//! Error types for scene configuration.

use std::fmt;

/// Errors that can occur while loading or validating a [`SceneConfig`](crate::SceneConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    Io {
        /// Path that could not be read.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration text is not valid JSON for the schema.
    Parse(serde_json::Error),
    /// Shadow map size is not one of the supported resolutions.
    InvalidShadowMapSize(u32),
    /// A numeric field lies outside its allowed range.
    OutOfRange {
        /// Dotted path of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read config {path}: {source}"),
            Self::Parse(e) => write!(f, "failed to parse config: {e}"),
            Self::InvalidShadowMapSize(size) => {
                write!(
                    f,
                    "shadow map size {size} is not one of 256, 512, 1024, 2048, 4096"
                )
            }
            Self::OutOfRange {
                field,
                value,
                expected,
            } => write!(f, "{field} = {value} is out of range, expected {expected}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_out_of_range() {
        let err = ConfigError::OutOfRange {
            field: "steering.approach_factor",
            value: 2.0,
            expected: "(0, 1]",
        };
        assert_eq!(
            err.to_string(),
            "steering.approach_factor = 2 is out of range, expected (0, 1]"
        );
    }

    #[test]
    fn test_parse_error_has_source() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = ConfigError::from(json_err);
        assert!(std::error::Error::source(&err).is_some());
    }
}
