//! Command-line interface.
//!
//! `main` parses the arguments, lets [`run_cli_command`] handle the
//! commands that finish immediately, and otherwise starts a chat:
//!
//! ```ignore
//! use chatstream::cli::{parse_args, run_cli_command, CliCommand};
//!
//! let command = parse_args(std::env::args())?;
//! if let Some(result) = run_cli_command(&command).await {
//!     return result;
//! }
//! ```

pub mod args;
pub mod chat;
pub mod keys;
pub mod render;
pub mod version;

pub use args::{parse_args, CliCommand, USAGE};
pub use chat::{run_interactive, run_once};
pub use keys::{handle_clear_key, handle_set_key};
pub use render::TranscriptPrinter;
pub use version::{version_string, VERSION};

use color_eyre::Result;

use crate::adapters::FileCredentialsProvider;

/// Run a command that does not need a chat session.
///
/// Returns `None` for [`CliCommand::Chat`].
pub async fn run_cli_command(command: &CliCommand) -> Option<Result<()>> {
    match command {
        CliCommand::Version => {
            println!("{}", version_string());
            Some(Ok(()))
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            Some(Ok(()))
        }
        CliCommand::SetKey(key) => Some(set_key(key).await),
        CliCommand::ClearKey => Some(clear_key().await),
        CliCommand::Chat { .. } => None,
    }
}

async fn set_key(key: &str) -> Result<()> {
    let provider = FileCredentialsProvider::new()?;
    handle_set_key(&provider, key).await?;
    println!("API key saved to {}", provider.credentials_path().display());
    Ok(())
}

async fn clear_key() -> Result<()> {
    let provider = FileCredentialsProvider::new()?;
    handle_clear_key(&provider).await?;
    println!("API key removed");
    Ok(())
}
