// ABOUTME: Configuration errors raised while building and ordering an appstack.
// ABOUTME: Every variant is fatal: no ordered stack is produced after one of them.

use crate::types::{AppName, AppNameError};
use std::fmt::Write;

/// A malformed appstack.
///
/// Parsing, validation, graph building, cycle detection and manual ordering
/// all report through this one type so callers can treat any of them as
/// "the appstack is wrong, fix it and try again".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StackError {
    /// An application record has no name.
    #[error("application configuration malformed: name not specified (apps[{position}])")]
    MissingAppName { position: usize },

    /// An application record has a name that isn't a usable string.
    #[error("application configuration malformed: apps[{position}]: {source}")]
    InvalidAppName {
        position: usize,
        #[source]
        source: AppNameError,
    },

    /// The `name` field is present but isn't a string.
    #[error("application configuration malformed: apps[{position}] name is not a string")]
    NameNotString { position: usize },

    /// An application record has a key that isn't an application setting.
    #[error("application configuration malformed: apps[{position}] has unknown field `{field}`")]
    UnknownAppField { position: usize, field: String },

    /// `order` is set to something other than an integer.
    #[error("app {app}: order parameter is not an integer")]
    OrderNotInteger { app: AppName },

    /// `app_properties.services` is not a list of service names.
    #[error("app {app}: \"services\" must be a list of service instance names")]
    ServicesNotNames { app: AppName },

    /// `register_in` points at an application missing from the stack.
    #[error("\"register_in\" field of app {app} points to a nonexistent app: {register_in}")]
    UnknownRegistrator { app: AppName, register_in: String },

    /// Two providers declare a service instance with the same name.
    #[error("the same service defined twice: {service}")]
    DuplicateService { service: String },

    /// A required service is provided by nobody.
    #[error("service instance {service} required by {app} isn't defined anywhere")]
    UndefinedService { app: AppName, service: String },

    /// The dependency graph has cycles; each entry lists the apps of one cycle.
    #[error(
        "appstack can't be reliably deployed, because there are cycles in app dependencies: {}",
        format_cycles(.cycles)
    )]
    Cycles { cycles: Vec<Vec<AppName>> },

    /// Two applications were given the same fixed position.
    #[error("few apps have the same order parameter ({order}): {first} and {second}")]
    DuplicateOrder {
        order: i64,
        first: AppName,
        second: AppName,
    },
}

impl StackError {
    /// Names of every application mentioned by a cycle error.
    pub fn cycle_members(&self) -> Vec<&AppName> {
        match self {
            StackError::Cycles { cycles } => cycles.iter().flatten().collect(),
            _ => Vec::new(),
        }
    }
}

fn format_cycles(cycles: &[Vec<AppName>]) -> String {
    let mut out = String::new();
    for (i, cycle) in cycles.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('[');
        for (j, app) in cycle.iter().enumerate() {
            if j > 0 {
                out.push_str(" -> ");
            }
            let _ = write!(out, "{app}");
        }
        out.push(']');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> AppName {
        AppName::new(s).unwrap()
    }

    #[test]
    fn cycles_message_lists_every_member() {
        let err = StackError::Cycles {
            cycles: vec![vec![name("a"), name("b")], vec![name("c")]],
        };
        let message = err.to_string();
        assert!(message.contains("[a -> b]"), "got: {message}");
        assert!(message.contains("[c]"), "got: {message}");
    }

    #[test]
    fn cycle_members_is_empty_for_other_errors() {
        let err = StackError::DuplicateService {
            service: "db".to_string(),
        };
        assert!(err.cycle_members().is_empty());
    }
}
