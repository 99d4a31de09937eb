use anyhow::Result;
use clap::{Parser, Subcommand};
use folio_extract::DocumentKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod extract;
mod state;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("FOLIO_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "folio", version = VERSION, about = "Extract structured JSON from financial PDFs")]
struct Cli {
    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a PDF into a JSON file
    Extract {
        /// bank, closing, bordereau or account
        #[arg(long, default_value = "account")]
        kind: DocumentKind,

        /// PDF to read (overrides [run].document)
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// JSON file to write (overrides [run].output)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Per-request timeout in seconds; 0 disables
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Print the text extracted from each page
    Text {
        #[arg(long)]
        pdf: PathBuf,

        /// Only this page (1-based)
        #[arg(long)]
        page: Option<usize>,
    },

    /// Manage ~/.folio/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Manage the model API key
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective configuration
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Paste an API key into ~/.folio/auth.json
    PasteApiKey,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

// LlmClient drives its own runtime, so main stays synchronous.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Extract {
            kind,
            pdf,
            out,
            timeout_secs,
        } => {
            extract::extract(
                kind,
                config::RunOverrides {
                    pdf,
                    out,
                    timeout_secs,
                },
            )?;
        }

        Command::Text { pdf, page } => {
            extract::print_text(&pdf, page)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },

        Command::Auth { command } => match command {
            AuthCommand::PasteApiKey => auth::paste_api_key()?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extract_defaults_to_account() {
        let cli = Cli::parse_from(["folio", "extract", "--pdf", "a.pdf"]);
        match cli.command {
            Command::Extract { kind, pdf, .. } => {
                assert_eq!(kind, DocumentKind::Account);
                assert_eq!(pdf, Some(PathBuf::from("a.pdf")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(Cli::try_parse_from(["folio", "extract", "--kind", "invoice"]).is_err());
    }
}
