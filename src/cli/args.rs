//! Command-line argument parsing.

use crate::error::ChatError;

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Store an API key in the credentials file
    SetKey(String),
    /// Remove the stored API key
    ClearKey,
    /// Chat: one-shot when a query is given, interactive otherwise
    Chat {
        base_url: Option<String>,
        query: Option<String>,
    },
}

pub const USAGE: &str = "\
Usage: chatstream [OPTIONS] [QUERY...]

Sends QUERY and prints the streamed answer. Without QUERY, reads one
message per line from stdin and keeps the conversation going.

Options:
  --base-url <url>   API base URL (default: $CHATSTREAM_BASE_URL or https://api.dify.ai/v1)
  --set-key <key>    Store an API key in ~/.chatstream/credentials.json
  --clear-key        Remove the stored API key
  -V, --version      Print version
  -h, --help         Print this help

Interactive commands: /new starts a new conversation, /quit exits.";

/// Parse command-line arguments and return the command to run.
///
/// The first item is the program name and is skipped. Everything that is
/// not a flag is joined with spaces to form the query.
///
/// # Examples
///
/// ```
/// use chatstream::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["chatstream".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()).unwrap(), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ChatError>
where
    I: Iterator<Item = String>,
{
    let mut args = args.skip(1);
    let mut base_url = None;
    let mut words: Vec<String> = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--clear-key" => return Ok(CliCommand::ClearKey),
            "--set-key" => {
                let key = required_value(&mut args, "--set-key")?;
                return Ok(CliCommand::SetKey(key));
            }
            "--base-url" => base_url = Some(required_value(&mut args, "--base-url")?),
            "--" => words.extend(args.by_ref()),
            flag if flag.starts_with("--") => {
                return Err(ChatError::Config(format!("unknown option {}", flag)));
            }
            _ => words.push(arg),
        }
    }

    let query = Some(words.join(" ")).filter(|q| !q.trim().is_empty());
    Ok(CliCommand::Chat { base_url, query })
}

fn required_value<I>(args: &mut I, flag: &str) -> Result<String, ChatError>
where
    I: Iterator<Item = String>,
{
    args.next()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ChatError::Config(format!("{} requires a value", flag)))
}
