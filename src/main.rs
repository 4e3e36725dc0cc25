use chatstream::cli::{parse_args, run_cli_command, run_interactive, run_once, CliCommand};
use chatstream::config::Config;

use color_eyre::Result;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "CHATSTREAM_LOG";

/// Log to stderr so answers on stdout stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let command = parse_args(std::env::args())?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        if let Some(result) = run_cli_command(&command).await {
            return result;
        }

        let CliCommand::Chat { base_url, query } = command else {
            return Ok(());
        };

        let mut config = Config::from_env();
        if let Some(url) = base_url {
            config = config.with_base_url(url);
        }
        tracing::debug!("Using {} as {}", config.base_url, config.user);

        match query {
            Some(query) => run_once(&config, &query).await,
            None => run_interactive(&config).await,
        }
    })
}
