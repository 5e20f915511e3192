use anyhow::Context;
use clap::Parser;
use fqdn_remediate::app::{handle_fatal_error, init_logging, AppConfig};
use fqdn_remediate::config::{load_config, ConfigOverrides};
use fqdn_remediate::remediate::run;
use fqdn_remediate::session::{HttpSession, Session};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Find assets without an FQDN and optionally write one back
#[derive(Parser)]
#[command(name = "fqdn-remediate")]
#[command(about = "Detect inventory assets with no FQDN and assign <name>.<domain>", long_about = None)]
#[command(version)]
struct Cli {
    /// Session cookie (JSESSIONID) to use for requests
    #[arg(short = 'c', long)]
    cookie: Option<String>,

    /// User-Agent header sent with every request
    #[arg(short = 'u', long)]
    user_agent: Option<String>,

    /// XSRF token
    #[arg(short = 'x', long)]
    xsrf_token: Option<String>,

    /// Base domain used in the FQDN (e.g. -d mycompany.com)
    #[arg(short = 'd', long)]
    domain: Option<String>,

    /// Base URL of the inventory service
    #[arg(long)]
    base_url: Option<String>,

    /// Write the synthesized FQDN back to each asset
    #[arg(long)]
    update: bool,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of concurrent fetch or write requests
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Abort the whole run on the first asset that fails
    #[arg(long)]
    fail_fast: bool,

    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    init_logging(&AppConfig::new(verbose));

    match run_cli(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => handle_fatal_error(e, verbose),
    }
}

async fn run_cli(cli: Cli) -> anyhow::Result<i32> {
    let overrides = ConfigOverrides {
        base_url: cli.base_url,
        domain: cli.domain,
        cookie: cli.cookie,
        xsrf_token: cli.xsrf_token,
        user_agent: cli.user_agent,
        max_concurrency: cli.max_concurrency,
        request_timeout_secs: cli.timeout,
        fail_fast: cli.fail_fast,
        update: cli.update,
    };

    let config = load_config(cli.config.as_deref(), overrides)
        .await
        .context("Failed to load configuration")?;
    debug!("Running against {}", config.base_url);

    let session: Arc<dyn Session> = Arc::new(HttpSession::new(
        &config.base_url,
        config.credentials.clone(),
        config.request_timeout(),
    )?);

    let options = config.pipeline_options();
    info!("Starting {:?} pass", options.mode);
    let report = run(session, &options).await.context("Remediation run aborted")?;

    let mut stdout = std::io::stdout().lock();
    report.render(&mut stdout)?;
    stdout.flush()?;

    Ok(report.exit_code())
}
