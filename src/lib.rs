//! # fqdn-remediate
//!
//! Finds inventory assets that have no fully-qualified domain name on any
//! network interface and, on request, writes back `<asset name>.<domain>`.
//!
//! ## Usage
//!
//! ```bash
//! fqdn-remediate --base-url https://usm.example.com -c <cookie> -x <xsrf> [-d corp.example.com --update]
//! ```
//!
//! ## Modules
//!
//! - `app` - Logging setup and fatal error reporting for the binary
//! - `config` - Layered run configuration (defaults, TOML file, CLI)
//! - `error` - Error taxonomy shared by every component
//! - `inventory` - Fixed asset query, decoded summaries, orphan classifier
//! - `remediate` - Fetch, patch and write-back pipeline with reporting
//! - `session` - Transport session trait, HTTP implementation and test mock
pub mod app;
pub mod config;
pub mod error;
pub mod inventory;
pub mod remediate;
pub mod session;

pub use error::{Error, Result};
