//! Logging configuration and initialization

use crate::app::config::AppConfig;
use tracing::{debug, trace};

/// Initialize tracing for the application.
///
/// Logs go to stderr so the run report on stdout stays clean.
pub fn init_logging(config: &AppConfig) {
    let log_level = config.log_level();

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(config.verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(config.verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(config.verbose >= 3) // Show line numbers for -vvv
        .init();

    debug!("fqdn-remediate started with verbosity level: {}", config.verbose);
    trace!(
        "CLI arg count: {} (values omitted, they carry credentials)",
        std::env::args().count()
    );
}
