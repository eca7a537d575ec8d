// ABOUTME: Deployment of an ordered appstack onto a Cloud Foundry platform.
// ABOUTME: The platform is reached through the PlatformDriver trait.

mod driver;
mod dry_run;
mod error;
mod orchestrate;
mod version;

pub use driver::{LiveApp, PlatformDriver};
pub use dry_run::{DriverCall, DryRunDriver};
pub use error::{DriverError, DriverErrorKind};
pub use orchestrate::{
    DeployOptions, DeployReport, EntityKind, PushStrategy, Skipped, deploy_appstack,
    registrator_url,
};
pub use version::push_needed;
