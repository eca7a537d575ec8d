// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;
use std::time::Instant;

use crate::deploy::{DeployReport, DriverCall};
use crate::order::DeploymentPlan;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                println!("{message}");
            }
            OutputMode::Json => emit(&JsonEvent {
                event: "success",
                message,
                duration_secs: self.duration(),
            }),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    duration_secs: self.duration(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Print deployment waves and the final order.
    pub fn plan(&self, plan: &DeploymentPlan) {
        let waves: Vec<Vec<&str>> = plan
            .waves
            .iter()
            .map(|wave| wave.iter().map(|name| name.as_str()).collect())
            .collect();
        let order: Vec<&str> = plan.order().map(|name| name.as_str()).collect();

        match self.mode {
            OutputMode::Normal => {
                for (index, wave) in waves.iter().enumerate() {
                    println!("wave {}: {}", index + 1, wave.join(", "));
                }
                println!("order: {}", order.join(" -> "));
            }
            OutputMode::Quiet => {
                for name in &order {
                    println!("{name}");
                }
            }
            OutputMode::Json => emit(&PlanEvent {
                event: "plan",
                waves,
                order,
            }),
        }
    }

    /// Print the calls a dry run would have made and its report.
    pub fn dry_run(&self, calls: &[DriverCall], report: &DeployReport) {
        match self.mode {
            OutputMode::Normal => {
                for call in calls {
                    println!("DRY RUN: {call}");
                }
                for skipped in &report.skipped {
                    println!("skipped {} {}", skipped.kind, skipped.name);
                }
                for warning in &report.warnings {
                    println!("warning: {}", warning.message);
                }
            }
            OutputMode::Quiet => {
                for call in calls {
                    println!("{call}");
                }
            }
            OutputMode::Json => emit(&DryRunEvent {
                event: "dry_run",
                calls,
                report,
            }),
        }
    }
}

fn emit<T: Serialize>(event: &T) {
    if let Ok(json) = serde_json::to_string(event) {
        println!("{json}");
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct PlanEvent<'a> {
    event: &'a str,
    waves: Vec<Vec<&'a str>>,
    order: Vec<&'a str>,
}

#[derive(Serialize)]
struct DryRunEvent<'a> {
    event: &'a str,
    calls: &'a [DriverCall],
    report: &'a DeployReport,
}
