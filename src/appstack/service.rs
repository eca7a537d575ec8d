// ABOUTME: User-provided service instances and security groups.
// ABOUTME: Plain records created on the platform before or alongside applications.

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

use super::{default_push_if, is_true};

/// A named credential bundle not backed by a broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProvidedService {
    pub name: String,

    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub credentials: Mapping,

    #[serde(default = "default_push_if", skip_serializing_if = "is_true")]
    pub push_if: bool,
}

impl UserProvidedService {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            credentials: Mapping::new(),
            push_if: true,
        }
    }

    pub fn with_credential(mut self, key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.credentials.insert(key.into(), value.into());
        self
    }

    /// Credentials rendered as the JSON document the platform CLI expects.
    pub fn credentials_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.credentials)
    }
}

/// A platform security group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub name: String,
    pub protocol: String,
    pub destination: String,
    pub ports: String,

    #[serde(default = "default_push_if", skip_serializing_if = "is_true")]
    pub push_if: bool,
}

/// One rule of a security group as the platform's JSON rule file holds it.
#[derive(Debug, Serialize)]
struct SecurityRule<'a> {
    protocol: &'a str,
    destination: &'a str,
    ports: &'a str,
}

impl SecurityGroup {
    /// The rule document used when creating the group (without name and `push_if`).
    pub fn rules_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&[SecurityRule {
            protocol: &self.protocol,
            destination: &self.destination,
            ports: &self.ports,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_render_as_json_object() {
        let service = UserProvidedService::new("logs").with_credential("url", "http://logs");
        assert_eq!(service.credentials_json().unwrap(), r#"{"url":"http://logs"}"#);
    }

    #[test]
    fn security_group_rules_skip_name() {
        let group = SecurityGroup {
            name: "db-access".to_string(),
            protocol: "tcp".to_string(),
            destination: "10.0.0.0/24".to_string(),
            ports: "5432".to_string(),
            push_if: true,
        };
        let json = group.rules_json().unwrap();
        assert_eq!(
            json,
            r#"[{"protocol":"tcp","destination":"10.0.0.0/24","ports":"5432"}]"#
        );
    }
}
