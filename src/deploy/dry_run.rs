// ABOUTME: Driver that records platform calls instead of making them.
// ABOUTME: Backs the dry-run command and deployment tests.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use snafu::ResultExt;

use super::driver::{LiveApp, PlatformDriver};
use super::error::{DriverError, PayloadSnafu};
use crate::appstack::{
    AppConfig, BrokerConfig, SecurityGroup, ServiceInstance, UserProvidedService,
};
use crate::types::AppName;

/// A platform call as the dry-run driver saw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum DriverCall {
    UpsertUserProvidedService { name: String, credentials: String },
    UpsertServiceBroker { name: String, url: String },
    EnableServiceAccess { offering: String },
    EnsureServiceInstance { offering: String, name: String, plan: String },
    UpsertBuildpack { name: String },
    UpsertSecurityGroup { name: String, rules: String },
    RebindService { name: String, service: String },
    PushApp { name: String, artifact: String },
    RestartApp { name: String },
    RunPostCommand { name: String, command: String },
    RegisterApp { name: String, registrator: String, url: String },
}

impl DriverCall {
    /// Name of the entity the call is about.
    pub fn target(&self) -> &str {
        match self {
            DriverCall::UpsertUserProvidedService { name, .. }
            | DriverCall::UpsertServiceBroker { name, .. }
            | DriverCall::EnsureServiceInstance { name, .. }
            | DriverCall::UpsertBuildpack { name }
            | DriverCall::UpsertSecurityGroup { name, .. }
            | DriverCall::RebindService { name, .. }
            | DriverCall::PushApp { name, .. }
            | DriverCall::RestartApp { name }
            | DriverCall::RunPostCommand { name, .. }
            | DriverCall::RegisterApp { name, .. } => name,
            DriverCall::EnableServiceAccess { offering } => offering,
        }
    }
}

impl fmt::Display for DriverCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverCall::UpsertUserProvidedService { name, credentials } => {
                write!(f, "upsert user-provided service {name} {credentials}")
            }
            DriverCall::UpsertServiceBroker { name, url } => {
                write!(f, "upsert service broker {name} at {url}")
            }
            DriverCall::EnableServiceAccess { offering } => {
                write!(f, "enable service access {offering}")
            }
            DriverCall::EnsureServiceInstance {
                offering,
                name,
                plan,
            } => write!(f, "create service {offering} {plan} {name}"),
            DriverCall::UpsertBuildpack { name } => write!(f, "upsert buildpack {name}"),
            DriverCall::UpsertSecurityGroup { name, rules } => {
                write!(f, "upsert security group {name} {rules}")
            }
            DriverCall::RebindService { name, service } => {
                write!(f, "rebind {service} to {name}")
            }
            DriverCall::PushApp { name, artifact } => {
                write!(f, "push {name} from artifact {artifact}")
            }
            DriverCall::RestartApp { name } => write!(f, "restart {name}"),
            DriverCall::RunPostCommand { name, command } => {
                write!(f, "run post-push command of {name}: {command}")
            }
            DriverCall::RegisterApp {
                name,
                registrator,
                url,
            } => write!(f, "register {name} in {registrator} at {url}"),
        }
    }
}

/// Records every call and always succeeds.
///
/// No application is deployed unless declared with [`DryRunDriver::with_live_app`];
/// lookups are not recorded.
#[derive(Debug, Default)]
pub struct DryRunDriver {
    calls: Mutex<Vec<DriverCall>>,
    live: HashMap<String, LiveApp>,
}

impl DryRunDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `name` is deployed, at `version` when given.
    pub fn with_live_app(mut self, name: &str, version: Option<&str>) -> Self {
        let live = LiveApp {
            version: version.map(str::to_string),
        };
        self.live.insert(name.to_string(), live);
        self
    }

    /// Calls recorded so far, in call order.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().clone()
    }

    pub fn into_calls(self) -> Vec<DriverCall> {
        self.calls.into_inner()
    }

    fn record(&self, call: DriverCall) {
        tracing::info!("DRY RUN: {call}");
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl PlatformDriver for DryRunDriver {
    async fn upsert_user_provided_service(
        &self,
        service: &UserProvidedService,
    ) -> Result<(), DriverError> {
        let credentials = service
            .credentials_json()
            .context(PayloadSnafu {
                name: service.name.as_str(),
            })?;
        self.record(DriverCall::UpsertUserProvidedService {
            name: service.name.clone(),
            credentials,
        });
        Ok(())
    }

    async fn upsert_service_broker(&self, broker: &BrokerConfig) -> Result<(), DriverError> {
        self.record(DriverCall::UpsertServiceBroker {
            name: broker.name.clone(),
            url: broker.url.clone(),
        });
        Ok(())
    }

    async fn enable_service_access(&self, offering: &str) -> Result<(), DriverError> {
        self.record(DriverCall::EnableServiceAccess {
            offering: offering.to_string(),
        });
        Ok(())
    }

    async fn ensure_service_instance(
        &self,
        offering: &str,
        instance: &ServiceInstance,
    ) -> Result<(), DriverError> {
        self.record(DriverCall::EnsureServiceInstance {
            offering: offering.to_string(),
            name: instance.name.clone(),
            plan: instance.plan.clone(),
        });
        Ok(())
    }

    async fn upsert_buildpack(&self, name: &str) -> Result<(), DriverError> {
        self.record(DriverCall::UpsertBuildpack {
            name: name.to_string(),
        });
        Ok(())
    }

    async fn upsert_security_group(&self, group: &SecurityGroup) -> Result<(), DriverError> {
        let rules = group.rules_json().context(PayloadSnafu {
            name: group.name.as_str(),
        })?;
        self.record(DriverCall::UpsertSecurityGroup {
            name: group.name.clone(),
            rules,
        });
        Ok(())
    }

    async fn live_app(&self, name: &AppName) -> Result<Option<LiveApp>, DriverError> {
        Ok(self.live.get(name.as_str()).cloned())
    }

    async fn rebind_service(&self, app: &AppConfig, service: &str) -> Result<(), DriverError> {
        self.record(DriverCall::RebindService {
            name: app.name.to_string(),
            service: service.to_string(),
        });
        Ok(())
    }

    async fn push_app(&self, app: &AppConfig) -> Result<(), DriverError> {
        self.record(DriverCall::PushApp {
            name: app.name.to_string(),
            artifact: app.artifact_name.clone(),
        });
        Ok(())
    }

    async fn restart_app(&self, app: &AppConfig) -> Result<(), DriverError> {
        self.record(DriverCall::RestartApp {
            name: app.name.to_string(),
        });
        Ok(())
    }

    async fn run_post_command(&self, app: &AppConfig, command: &str) -> Result<(), DriverError> {
        self.record(DriverCall::RunPostCommand {
            name: app.name.to_string(),
            command: command.to_string(),
        });
        Ok(())
    }

    async fn register_app(
        &self,
        app: &AppConfig,
        registrator: &AppConfig,
        registrator_url: &str,
    ) -> Result<(), DriverError> {
        self.record(DriverCall::RegisterApp {
            name: app.name.to_string(),
            registrator: registrator.name.to_string(),
            url: registrator_url.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_in_order() {
        let driver = DryRunDriver::new();
        driver.upsert_buildpack("java").await.unwrap();
        driver.enable_service_access("mongo").await.unwrap();

        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::UpsertBuildpack {
                    name: "java".to_string()
                },
                DriverCall::EnableServiceAccess {
                    offering: "mongo".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn user_provided_service_credentials_are_json() {
        let driver = DryRunDriver::new();
        let service = UserProvidedService::new("db").with_credential("uri", "mongodb://db");
        driver.upsert_user_provided_service(&service).await.unwrap();

        let calls = driver.into_calls();
        assert_eq!(
            calls[0],
            DriverCall::UpsertUserProvidedService {
                name: "db".to_string(),
                credentials: r#"{"uri":"mongodb://db"}"#.to_string(),
            }
        );
        assert_eq!(calls[0].target(), "db");
    }

    #[tokio::test]
    async fn live_apps_are_looked_up_without_recording() {
        let driver = DryRunDriver::new().with_live_app("api", Some("1.0.0"));
        let api = AppName::new("api").unwrap();
        let web = AppName::new("web").unwrap();

        let live = driver.live_app(&api).await.unwrap();
        assert_eq!(live.and_then(|l| l.version).as_deref(), Some("1.0.0"));
        assert_eq!(driver.live_app(&web).await.unwrap(), None);
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn display_is_readable() {
        let call = DriverCall::EnsureServiceInstance {
            offering: "mongo".to_string(),
            name: "orders-db".to_string(),
            plan: "free".to_string(),
        };
        assert_eq!(call.to_string(), "create service mongo free orders-db");
    }
}
