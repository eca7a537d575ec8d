// ABOUTME: Validated domain types shared across the crate.
// ABOUTME: Application names double as dependency graph node identities.

mod app_name;

pub use app_name::{AppName, AppNameError};
