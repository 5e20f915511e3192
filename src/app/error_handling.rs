//! Error handling utilities
//!
//! This module provides centralized fatal error reporting for the binary.

use crate::error::Error;
use tracing::error;

/// Report a fatal error and exit with the matching status code
///
/// - For [`Error`]: exit code comes from [`Error::exit_code`]
/// - For other errors: general failure (1)
///
/// With `verbose >= 1` the full error chain is printed as well.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {:#}", error);
    eprintln!("Error: {error:#}");

    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    std::process::exit(exit_code_for(&error))
}

/// Exit code for an error that ended the run.
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map_or(1, Error::exit_code)
}
