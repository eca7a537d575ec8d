// ABOUTME: Applies an ordered appstack to the platform through a driver.
// ABOUTME: Global services and brokers first, then apps in order, then registrations.

use std::fmt;

use serde::Serialize;

use super::driver::{LiveApp, PlatformDriver};
use super::error::DriverError;
use super::version::push_needed;
use crate::appstack::{AppConfig, AppStack, BrokerConfig, UserProvidedService};
use crate::diagnostics::{Diagnostics, Warning};
use crate::types::AppName;

/// When an application that is already deployed gets pushed again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PushStrategy {
    /// Push only when the appstack carries a newer version, restart otherwise.
    #[default]
    Upgrade,
    /// Push every application.
    PushAll,
}

/// Options for a deployment run.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeployOptions {
    /// Record failed steps as warnings and keep going.
    pub ignore_errors: bool,
    pub strategy: PushStrategy,
}

/// What kind of platform entity a step touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    UserProvidedService,
    ServiceBroker,
    ServiceInstance,
    SecurityGroup,
    App,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            EntityKind::UserProvidedService => "user-provided service",
            EntityKind::ServiceBroker => "service broker",
            EntityKind::ServiceInstance => "service instance",
            EntityKind::SecurityGroup => "security group",
            EntityKind::App => "app",
        };
        f.write_str(kind)
    }
}

/// An entity left alone because of `push_if: false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub kind: EntityKind,
    pub name: String,
}

/// Outcome of a deployment run.
#[derive(Debug, Default, Serialize)]
pub struct DeployReport {
    /// Applications pushed successfully, in push order.
    pub pushed: Vec<AppName>,
    /// Up-to-date applications restarted instead of pushed.
    pub restarted: Vec<AppName>,
    pub skipped: Vec<Skipped>,
    pub warnings: Vec<Warning>,
}

/// Deploy `stack` in its current application order.
///
/// The stack is expected to be sorted already (see [`crate::order::plan`]).
/// Without `ignore_errors` the first failing step aborts the run. Applications
/// already deployed get their services rebound, then are pushed or restarted
/// according to the [`PushStrategy`].
pub async fn deploy_appstack<D>(
    stack: &AppStack,
    driver: &D,
    options: DeployOptions,
) -> Result<DeployReport, DriverError>
where
    D: PlatformDriver + ?Sized,
{
    let mut run = Run {
        driver,
        options,
        diagnostics: Diagnostics::default(),
        report: DeployReport::default(),
    };

    for service in &stack.user_provided_services {
        run.user_provided_service(service).await?;
    }
    for broker in &stack.brokers {
        run.broker(broker).await?;
    }
    for buildpack in &stack.buildpacks {
        let result = driver.upsert_buildpack(buildpack).await;
        run.step(format!("upsert of buildpack {buildpack}"), result)?;
    }
    for group in &stack.security_groups {
        if !group.push_if {
            run.skip(EntityKind::SecurityGroup, &group.name);
            continue;
        }
        let result = driver.upsert_security_group(group).await;
        run.step(format!("upsert of security group {}", group.name), result)?;
    }

    for app in &stack.apps {
        run.app(app).await?;
    }
    for app in &stack.apps {
        run.registration(stack, app).await?;
    }

    Ok(run.finish())
}

struct Run<'a, D: ?Sized> {
    driver: &'a D,
    options: DeployOptions,
    diagnostics: Diagnostics,
    report: DeployReport,
}

impl<D> Run<'_, D>
where
    D: PlatformDriver + ?Sized,
{
    /// Returns whether the step succeeded; failures only propagate when not ignored.
    fn step(&mut self, what: String, result: Result<(), DriverError>) -> Result<bool, DriverError> {
        match result {
            Ok(()) => {
                tracing::debug!("{what} done");
                Ok(true)
            }
            Err(e) if self.options.ignore_errors => {
                self.diagnostics
                    .warn(Warning::step_failed(format!("{what} failed: {e}")));
                Ok(false)
            }
            Err(e) => {
                tracing::error!(error = %e, "{what} failed");
                Err(e)
            }
        }
    }

    fn skip(&mut self, kind: EntityKind, name: &str) {
        tracing::info!(%kind, name, "push_if is false, skipping");
        self.report.skipped.push(Skipped {
            kind,
            name: name.to_string(),
        });
    }

    async fn user_provided_service(
        &mut self,
        service: &UserProvidedService,
    ) -> Result<(), DriverError> {
        if !service.push_if {
            self.skip(EntityKind::UserProvidedService, &service.name);
            return Ok(());
        }
        let result = self.driver.upsert_user_provided_service(service).await;
        self.step(
            format!("upsert of user-provided service {}", service.name),
            result,
        )?;
        Ok(())
    }

    async fn broker(&mut self, broker: &BrokerConfig) -> Result<(), DriverError> {
        if !broker.push_if {
            self.skip(EntityKind::ServiceBroker, &broker.name);
            return Ok(());
        }
        let result = self.driver.upsert_service_broker(broker).await;
        self.step(format!("upsert of service broker {}", broker.name), result)?;

        // The broker may only expose labelled offerings, so its own name is optional.
        if let Err(e) = self.driver.enable_service_access(&broker.name).await {
            self.diagnostics.warn(Warning::service_access(format!(
                "could not enable access to {}: {e}",
                broker.name
            )));
        }
        for label in broker.labels() {
            if label == broker.name {
                continue;
            }
            let result = self.driver.enable_service_access(label).await;
            self.step(format!("enabling access to {label}"), result)?;
        }

        for instance in &broker.service_instances {
            if !instance.push_if {
                self.skip(EntityKind::ServiceInstance, &instance.name);
                continue;
            }
            let offering = instance.offering(broker);
            let result = self.driver.ensure_service_instance(offering, instance).await;
            self.step(
                format!("creation of service instance {} from {offering}", instance.name),
                result,
            )?;
        }
        Ok(())
    }

    async fn app(&mut self, app: &AppConfig) -> Result<(), DriverError> {
        if !app.push_if {
            self.skip(EntityKind::App, app.name.as_str());
            return Ok(());
        }

        let live = match self.driver.live_app(&app.name).await {
            Ok(live) => live,
            Err(e) => {
                tracing::debug!(app = %app.name, error = %e, "live app lookup failed, treating it as absent");
                None
            }
        };
        if live.is_some() {
            // Services provided earlier in this run may have changed under the binding.
            for service in app.required_services().unwrap_or_default() {
                let result = self.driver.rebind_service(app, service).await;
                self.step(format!("rebinding of {service} to {}", app.name), result)?;
            }
        }

        let updated = self.update(app, live.as_ref()).await?;
        if let (true, Some(command)) = (updated, &app.push_options.post_command) {
            tracing::info!(app = %app.name, "running post-push command");
            let result = self.driver.run_post_command(app, command).await;
            self.step(format!("post-push command of {}", app.name), result)?;
        }

        for service in &app.user_provided_services {
            self.user_provided_service(service).await?;
        }
        if let Some(broker) = &app.broker_config {
            self.broker(broker).await?;
        }
        Ok(())
    }

    /// Bring the application to its appstack version; returns whether it got there.
    async fn update(&mut self, app: &AppConfig, live: Option<&LiveApp>) -> Result<bool, DriverError> {
        let live_version = live.and_then(|l| l.version.as_deref());
        let wanted = app.version().unwrap_or_default();
        if self.options.strategy == PushStrategy::PushAll || push_needed(live_version, &wanted) {
            return self.push(app).await;
        }

        if app.starts_stopped() {
            tracing::info!(app = %app.name, version = %wanted, "app is up to date and stays stopped");
            return Ok(true);
        }
        tracing::info!(app = %app.name, version = %wanted, "app is up to date, restarting it");
        match self.driver.restart_app(app).await {
            Ok(()) => {
                self.report.restarted.push(app.name.clone());
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(app = %app.name, error = %e, "restart failed, pushing instead");
                self.push(app).await
            }
        }
    }

    async fn push(&mut self, app: &AppConfig) -> Result<bool, DriverError> {
        tracing::info!(app = %app.name, "pushing app");
        let result = self.driver.push_app(app).await;
        let pushed = self.step(format!("push of {}", app.name), result)?;
        if pushed {
            self.report.pushed.push(app.name.clone());
        }
        Ok(pushed)
    }

    async fn registration(&mut self, stack: &AppStack, app: &AppConfig) -> Result<(), DriverError> {
        let Some(registrator_name) = &app.register_in else {
            return Ok(());
        };
        if !app.push_if {
            return Ok(());
        }

        let result = match stack.app(registrator_name.as_str()) {
            Some(registrator) => {
                let url = registrator_url(registrator_name, &stack.domain);
                tracing::info!(app = %app.name, registrator = %registrator_name, %url, "registering app");
                self.driver.register_app(app, registrator, &url).await
            }
            None => Err(DriverError::NotFound {
                what: "registrator app",
                name: registrator_name.to_string(),
            }),
        };
        self.step(
            format!("registration of {} in {registrator_name}", app.name),
            result,
        )?;
        Ok(())
    }

    fn finish(self) -> DeployReport {
        DeployReport {
            warnings: self.diagnostics.into_warnings(),
            ..self.report
        }
    }
}

/// Address a registrator application is reachable under.
pub fn registrator_url(registrator: &AppName, domain: &str) -> String {
    format!("http://{registrator}.{domain}")
}
