// ABOUTME: Configuration of a single appstack application.
// ABOUTME: Holds manifest properties, provided services, broker and ordering hints.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::broker::BrokerConfig;
use super::error::StackError;
use super::is_true;
use super::service::UserProvidedService;
use crate::types::AppName;

/// Manifest key listing the service instances an application binds to.
pub const SERVICES_KEY: &str = "services";

/// Manifest key holding the name the application is pushed under.
pub const NAME_KEY: &str = "name";

/// Manifest key holding the application's environment variables.
pub const ENV_KEY: &str = "env";

/// Environment variable carrying the application version.
pub const VERSION_VARIABLE: &str = "VERSION";

/// Configuration for one application of the stack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub name: AppName,

    /// Manifest-style properties ("services", "env", "memory", ...).
    #[serde(skip_serializing_if = "Mapping::is_empty")]
    pub app_properties: Mapping,

    /// User-provided services created along with this application.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user_provided_services: Vec<UserProvidedService>,

    /// Broker created from this application.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker_config: Option<BrokerConfig>,

    pub artifact_name: String,

    /// Application this one registers in after deployment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_in: Option<AppName>,

    #[serde(skip_serializing_if = "PushOptions::is_default")]
    pub push_options: PushOptions,

    /// Fixed position in the deployment sequence; negative counts from the end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,

    #[serde(skip_serializing_if = "is_true")]
    pub push_if: bool,
}

/// Parameters for pushing the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushOptions {
    /// Extra arguments for the push command.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub params: String,

    /// Shell command run after the push.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_command: Option<String>,
}

impl PushOptions {
    pub fn is_default(&self) -> bool {
        *self == PushOptions::default()
    }
}

impl AppConfig {
    pub fn new(name: AppName) -> Self {
        Self {
            artifact_name: name.to_string(),
            name,
            app_properties: Mapping::new(),
            user_provided_services: Vec::new(),
            broker_config: None,
            register_in: None,
            push_options: PushOptions::default(),
            order: None,
            push_if: true,
        }
    }

    pub fn with_artifact_name(mut self, artifact_name: impl Into<String>) -> Self {
        self.artifact_name = artifact_name.into();
        self
    }

    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.app_properties.insert(key.into(), value.into());
        self
    }

    /// Declare the service instances this application binds to.
    pub fn requiring<I, S>(self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<Value> = services
            .into_iter()
            .map(|s| Value::String(s.into()))
            .collect();
        self.with_property(SERVICES_KEY, Value::Sequence(names))
    }

    pub fn providing(mut self, service: UserProvidedService) -> Self {
        self.user_provided_services.push(service);
        self
    }

    pub fn with_broker(mut self, broker: BrokerConfig) -> Self {
        self.broker_config = Some(broker);
        self
    }

    pub fn with_register_in(mut self, registrator: AppName) -> Self {
        self.register_in = Some(registrator);
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_push_if(mut self, push_if: bool) -> Self {
        self.push_if = push_if;
        self
    }

    pub fn is_ordered(&self) -> bool {
        self.order.is_some()
    }

    /// Names of the service instances this application binds to.
    pub fn required_services(&self) -> Result<Vec<&str>, StackError> {
        let Some(services) = self.app_properties.get(SERVICES_KEY) else {
            return Ok(Vec::new());
        };

        let malformed = || StackError::ServicesNotNames {
            app: self.name.clone(),
        };

        match services {
            Value::Null => Ok(Vec::new()),
            Value::Sequence(items) => items
                .iter()
                .map(|item| item.as_str().ok_or_else(malformed))
                .collect(),
            _ => Err(malformed()),
        }
    }

    /// The `VERSION` environment variable from the application's properties.
    pub fn version(&self) -> Option<String> {
        match self.app_properties.get(ENV_KEY)?.get(VERSION_VARIABLE)? {
            Value::String(version) => Some(version.clone()),
            Value::Number(version) => Some(version.to_string()),
            _ => None,
        }
    }

    /// Whether the push parameters keep the application stopped.
    pub fn starts_stopped(&self) -> bool {
        self.push_options
            .params
            .split_whitespace()
            .any(|param| param == "--no-start")
    }

    /// Names of the service instances this application provides: its inline
    /// user-provided services followed by the instances of its broker.
    pub fn provided_services(&self) -> impl Iterator<Item = &str> {
        let inline = self.user_provided_services.iter().map(|s| s.name.as_str());
        let brokered = self
            .broker_config
            .iter()
            .flat_map(|b| b.service_instances.iter().map(|i| i.name.as_str()));
        inline.chain(brokered)
    }
}
