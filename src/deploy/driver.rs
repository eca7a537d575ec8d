// ABOUTME: Contract of the platform driver that applies an appstack.
// ABOUTME: Every operation is an idempotent create-or-update on the platform.

use async_trait::async_trait;

use super::error::DriverError;
use crate::appstack::{
    AppConfig, BrokerConfig, SecurityGroup, ServiceInstance, UserProvidedService,
};
use crate::types::AppName;

/// An application as currently deployed on the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveApp {
    /// Its `VERSION` environment variable, when set.
    pub version: Option<String>,
}

/// Operations the deployment needs from the platform.
///
/// Implementations wrap the platform CLI or API. Each call must leave the
/// entity in the configured state whether or not it existed before.
#[async_trait]
pub trait PlatformDriver: Send + Sync {
    /// Create or update a user-provided service instance.
    async fn upsert_user_provided_service(
        &self,
        service: &UserProvidedService,
    ) -> Result<(), DriverError>;

    /// Create or update a service broker registration.
    async fn upsert_service_broker(&self, broker: &BrokerConfig) -> Result<(), DriverError>;

    /// Make a marketplace offering visible.
    async fn enable_service_access(&self, offering: &str) -> Result<(), DriverError>;

    /// Create a service instance of `offering` unless it exists.
    async fn ensure_service_instance(
        &self,
        offering: &str,
        instance: &ServiceInstance,
    ) -> Result<(), DriverError>;

    /// Create or update a buildpack.
    async fn upsert_buildpack(&self, name: &str) -> Result<(), DriverError>;

    /// Create or update a security group.
    async fn upsert_security_group(&self, group: &SecurityGroup) -> Result<(), DriverError>;

    /// Look up a deployed application; `Ok(None)` when it is not deployed.
    async fn live_app(&self, name: &AppName) -> Result<Option<LiveApp>, DriverError>;

    /// Unbind `service` from `app` and bind it again.
    async fn rebind_service(&self, app: &AppConfig, service: &str) -> Result<(), DriverError>;

    /// Push an application.
    async fn push_app(&self, app: &AppConfig) -> Result<(), DriverError>;

    async fn restart_app(&self, app: &AppConfig) -> Result<(), DriverError>;

    /// Run the application's post-push shell command.
    async fn run_post_command(&self, app: &AppConfig, command: &str) -> Result<(), DriverError>;

    /// Register `app` in `registrator`, reachable under `registrator_url`.
    async fn register_app(
        &self,
        app: &AppConfig,
        registrator: &AppConfig,
        registrator_url: &str,
    ) -> Result<(), DriverError>;
}
