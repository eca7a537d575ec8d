// ABOUTME: Library root for cfstack - appstack model, ordering and deployment.
// ABOUTME: The main binary is in main.rs.

pub mod appstack;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod manifest;
pub mod order;
pub mod output;
pub mod types;
