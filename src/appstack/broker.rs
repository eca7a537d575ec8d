// ABOUTME: Service broker configuration and the instances created from it.
// ABOUTME: Brokers are service providers, never nodes of the dependency graph.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use super::{default_push_if, is_true};

/// Configuration of a platform service broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub name: String,
    pub url: String,
    pub auth_username: String,
    pub auth_password: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_instances: Vec<ServiceInstance>,

    #[serde(default = "default_push_if", skip_serializing_if = "is_true")]
    pub push_if: bool,
}

impl BrokerConfig {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        auth_username: impl Into<String>,
        auth_password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            auth_username: auth_username.into(),
            auth_password: auth_password.into(),
            services: Vec::new(),
            service_instances: Vec::new(),
            push_if: true,
        }
    }

    pub fn with_instance(mut self, instance: ServiceInstance) -> Self {
        self.service_instances.push(instance);
        self
    }

    /// Distinct instance labels, in first-seen order.
    ///
    /// A label marks an instance as belonging to a differently named
    /// marketplace offering that needs its own service access.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for label in self.service_instances.iter().filter_map(|i| i.label.as_deref()) {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }
}

/// A service instance created from a broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub name: String,
    pub plan: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default = "default_push_if", skip_serializing_if = "is_true")]
    pub push_if: bool,
}

impl ServiceInstance {
    pub fn new(name: impl Into<String>, plan: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plan: plan.into(),
            label: None,
            push_if: true,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Marketplace offering to create the instance from.
    pub fn offering<'a>(&'a self, broker: &'a BrokerConfig) -> &'a str {
        self.label.as_deref().unwrap_or(&broker.name)
    }
}
