//! Log sink for the harness.
//!
//! Every significant action, success and failure funnels through
//! [`info`]/[`warn`] so a single line of context identifies what element and
//! what operation was involved when a test fails. Fan-out beyond the process
//! logger (report attachments and the like) is up to the embedding runner.

use colored::Colorize;

/// Install the process-wide logger. Safe to call more than once; later calls
/// are ignored.
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init()
        .ok();
}

/// Record a significant step, success or failure.
pub fn info(message: impl AsRef<str>) {
    log::info!(target: "webharness", "{}", message.as_ref());
}

/// Record a recovered problem (malformed config value, swallowed teardown
/// failure).
pub fn warn(message: impl AsRef<str>) {
    log::warn!(target: "webharness", "{}", message.as_ref());
}

/// Console banner marking the start of a scenario.
pub fn scenario_banner(name: &str) {
    println!("{} {}", "Scenario:".blue().bold(), name.bold());
    info(format!("Validating scenario ==> {name}"));
}
