// ABOUTME: Platform driver error types with SNAFU pattern.
// ABOUTME: Covers failed platform commands, missing entities and bad payloads.

use snafu::Snafu;

/// Failure reported by a platform driver.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DriverError {
    #[snafu(display("platform command `{command}` failed: {message}"))]
    CommandFailed { command: String, message: String },

    #[snafu(display("{what} not found: {name}"))]
    NotFound { what: &'static str, name: String },

    #[snafu(display("could not render payload for {name}: {source}"))]
    Payload {
        name: String,
        source: serde_json::Error,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverErrorKind {
    /// The platform rejected or failed a command.
    CommandFailed,
    /// An entity the step relies on doesn't exist.
    NotFound,
    /// Configuration couldn't be turned into the platform's format.
    Payload,
}

impl DriverError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> DriverErrorKind {
        match self {
            DriverError::CommandFailed { .. } => DriverErrorKind::CommandFailed,
            DriverError::NotFound { .. } => DriverErrorKind::NotFound,
            DriverError::Payload { .. } => DriverErrorKind::Payload,
        }
    }

    /// Returns the failed command if this is a command failure.
    pub fn command(&self) -> Option<&str> {
        match self {
            DriverError::CommandFailed { command, .. } => Some(command),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let err = DriverError::CommandFailed {
            command: "push web".to_string(),
            message: "exit status 1".to_string(),
        };
        assert_eq!(err.kind(), DriverErrorKind::CommandFailed);
        assert_eq!(err.command(), Some("push web"));

        let err = DriverError::NotFound {
            what: "app",
            name: "web".to_string(),
        };
        assert_eq!(err.kind(), DriverErrorKind::NotFound);
        assert!(err.command().is_none());
    }
}
