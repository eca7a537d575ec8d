// ABOUTME: The appstack configuration model and its YAML parsing.
// ABOUTME: Handles discovery, loading, validation and serialization of appstack files.

mod app;
mod broker;
mod error;
mod merge;
mod raw;
mod service;

pub use app::{AppConfig, ENV_KEY, NAME_KEY, PushOptions, SERVICES_KEY, VERSION_VARIABLE};
pub use broker::{BrokerConfig, ServiceInstance};
pub use error::StackError;
pub use merge::{Manifests, merge_manifest};
pub use service::{SecurityGroup, UserProvidedService};

use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

pub const APPSTACK_FILENAME: &str = "appstack.yml";
pub const APPSTACK_FILENAME_ALT: &str = "appstack.yaml";
pub const EXPANDED_APPSTACK_FILENAME: &str = "expanded_appstack.yml";

/// The whole platform configuration: applications, brokers and services that
/// should exist on the platform.
///
/// After expansion `apps` is in deployment order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppStack {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub apps: Vec<AppConfig>,

    /// User-provided services not created from any application.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user_provided_services: Vec<UserProvidedService>,

    /// Brokers not created from any application.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub brokers: Vec<BrokerConfig>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buildpacks: Vec<String>,

    /// Address domain of the environment (`example.com` for `app.example.com`).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub domain: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_groups: Vec<SecurityGroup>,
}

impl AppStack {
    /// Build a stack from applications, checking `register_in` references.
    pub fn new(apps: Vec<AppConfig>) -> std::result::Result<Self, StackError> {
        let stack = AppStack {
            apps,
            ..Default::default()
        };
        stack.validate()?;
        Ok(stack)
    }

    pub fn with_user_provided_services(mut self, services: Vec<UserProvidedService>) -> Self {
        self.user_provided_services = services;
        self
    }

    pub fn with_brokers(mut self, brokers: Vec<BrokerConfig>) -> Self {
        self.brokers = brokers;
        self
    }

    pub fn with_buildpacks(mut self, buildpacks: Vec<String>) -> Self {
        self.buildpacks = buildpacks;
        self
    }

    pub fn with_security_groups(mut self, groups: Vec<SecurityGroup>) -> Self {
        self.security_groups = groups;
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let raw: raw::RawAppStack = serde_yaml::from_str(yaml)?;
        Ok(AppStack::try_from(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading appstack");
        Self::from_yaml(&content)
    }

    /// Find and load the appstack file of a directory.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [dir.join(APPSTACK_FILENAME), dir.join(APPSTACK_FILENAME_ALT)];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::AppstackNotFound(dir.to_path_buf()))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Error::from)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "saving appstack");
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    pub fn app(&self, name: &str) -> Option<&AppConfig> {
        self.apps.iter().find(|app| app.name == name)
    }

    /// Check that every non-empty `register_in` points to an application of
    /// this stack.
    pub fn validate(&self) -> std::result::Result<(), StackError> {
        let names: HashSet<&str> = self.apps.iter().map(|app| app.name.as_str()).collect();

        for app in &self.apps {
            if let Some(registrator) = &app.register_in
                && !names.contains(registrator.as_str())
            {
                return Err(StackError::UnknownRegistrator {
                    app: app.name.clone(),
                    register_in: registrator.to_string(),
                });
            }
        }

        Ok(())
    }
}

pub(crate) fn default_push_if() -> bool {
    true
}

pub(crate) fn is_true(value: &bool) -> bool {
    *value
}
