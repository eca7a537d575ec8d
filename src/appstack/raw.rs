// ABOUTME: Raw appstack records as they come out of YAML.
// ABOUTME: Loosely typed fields are checked in one validation pass into the model.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

use super::app::{AppConfig, PushOptions};
use super::broker::BrokerConfig;
use super::default_push_if;
use super::error::StackError;
use super::service::{SecurityGroup, UserProvidedService};
use super::AppStack;
use crate::types::AppName;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawAppStack {
    apps: Vec<RawApp>,
    user_provided_services: Vec<UserProvidedService>,
    brokers: Vec<BrokerConfig>,
    buildpacks: Vec<String>,
    domain: Option<String>,
    security_groups: Vec<SecurityGroup>,
}

/// An application record before its name and order are checked.
#[derive(Debug, Deserialize)]
struct RawApp {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    app_properties: Option<Mapping>,
    #[serde(default)]
    user_provided_services: Vec<UserProvidedService>,
    #[serde(default)]
    broker_config: Option<BrokerConfig>,
    #[serde(default)]
    artifact_name: Option<String>,
    #[serde(default)]
    register_in: Option<String>,
    #[serde(default)]
    push_options: Option<PushOptions>,
    #[serde(default)]
    order: Option<Value>,
    #[serde(default = "default_push_if")]
    push_if: bool,

    /// Keys that aren't application settings, usually typos.
    #[serde(flatten)]
    unknown: BTreeMap<String, Value>,
}

impl RawApp {
    fn into_app(self, position: usize) -> Result<AppConfig, StackError> {
        if let Some(field) = self.unknown.keys().next() {
            return Err(StackError::UnknownAppField {
                position,
                field: field.clone(),
            });
        }

        let name = match self.name {
            None | Some(Value::Null) => return Err(StackError::MissingAppName { position }),
            Some(Value::String(s)) if s.is_empty() => {
                return Err(StackError::MissingAppName { position });
            }
            Some(Value::String(s)) => AppName::new(&s)
                .map_err(|source| StackError::InvalidAppName { position, source })?,
            Some(_) => return Err(StackError::NameNotString { position }),
        };

        let order = match self.order {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) if n.is_i64() => n.as_i64(),
            Some(_) => return Err(StackError::OrderNotInteger { app: name }),
        };

        // An empty string means "not set" for the optional references.
        let register_in = match self.register_in.filter(|r| !r.is_empty()) {
            Some(r) => Some(AppName::new(&r).map_err(|_| StackError::UnknownRegistrator {
                app: name.clone(),
                register_in: r.clone(),
            })?),
            None => None,
        };

        let artifact_name = self
            .artifact_name
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| name.to_string());

        Ok(AppConfig {
            name,
            app_properties: self.app_properties.unwrap_or_default(),
            user_provided_services: self.user_provided_services,
            broker_config: self.broker_config,
            artifact_name,
            register_in,
            push_options: self.push_options.unwrap_or_default(),
            order,
            push_if: self.push_if,
        })
    }
}

impl TryFrom<RawAppStack> for AppStack {
    type Error = StackError;

    fn try_from(raw: RawAppStack) -> Result<Self, Self::Error> {
        let apps = raw
            .apps
            .into_iter()
            .enumerate()
            .map(|(position, app)| app.into_app(position))
            .collect::<Result<Vec<_>, _>>()?;

        let stack = AppStack {
            apps,
            user_provided_services: raw.user_provided_services,
            brokers: raw.brokers,
            buildpacks: raw.buildpacks,
            domain: raw.domain.unwrap_or_default(),
            security_groups: raw.security_groups,
        };
        stack.validate()?;
        Ok(stack)
    }
}
