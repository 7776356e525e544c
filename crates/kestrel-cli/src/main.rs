use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use kestrel_cli::commands;
use kestrel_cli::{DeviceArg, ExportFormat, OutputFormat};

#[derive(Parser)]
#[command(name = "kestrel")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "A CLI tool for auditing web performance via the PageSpeed Insights API",
    long_about = "Kestrel runs Lighthouse-style performance audits through the Google \
                  PageSpeed Insights API, normalizes the raw reports into typed metrics, \
                  and keeps a bounded local history you can inspect and export."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the local result store
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// PageSpeed Insights API key
    #[arg(long, global = true, env = "PAGESPEED_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a performance audit against a URL
    Analyze {
        /// Target URL (bare hostnames get https:// prepended)
        #[arg(value_name = "URL")]
        url: String,

        /// Device profile to audit under
        #[arg(short, long, value_enum, default_value_t = DeviceArg::Desktop)]
        device: DeviceArg,

        /// Extract metrics from a PageSpeed report on disk instead of calling the API
        #[arg(long, value_name = "FILE")]
        payload: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,

        /// Write the JSON export document to a file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Audit several URLs in sequence, continuing past failures
    Benchmark {
        /// Candidate URLs
        #[arg(value_name = "URL", required = true)]
        urls: Vec<String>,

        /// Device profile to audit under
        #[arg(short, long, value_enum, default_value_t = DeviceArg::Desktop)]
        device: DeviceArg,
    },

    /// Show past analysis results, newest first
    History {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,

        /// Show at most this many entries
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Export the latest result (json, pdf) or the whole history (csv)
    Export {
        /// Export format
        #[arg(value_enum, value_name = "FORMAT")]
        format: ExportFormat,

        /// Output file (defaults to kestrel-report-<date>.<ext>)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List the latest run's opportunities and track which are implemented
    Opportunities {
        /// Mark an opportunity id as implemented
        #[arg(long, value_name = "ID")]
        mark: Option<String>,

        /// Clear an implemented marker
        #[arg(long, value_name = "ID")]
        unmark: Option<String>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(short, long, value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Execute the command
    match cli.command {
        Commands::Analyze {
            url,
            device,
            payload,
            format,
            output,
        } => {
            commands::analyze::execute(
                &url,
                device,
                payload.as_deref(),
                format,
                output.as_deref(),
                cli.data_dir.as_deref(),
                cli.api_key,
            )
            .await
        }
        Commands::Benchmark { urls, device } => {
            commands::benchmark::execute(&urls, device, cli.data_dir.as_deref(), cli.api_key).await
        }
        Commands::History { format, limit } => {
            commands::history::execute(format, limit, cli.data_dir.as_deref())
        }
        Commands::Export { format, output } => {
            commands::export::execute(format, output.as_deref(), cli.data_dir.as_deref())
        }
        Commands::Opportunities { mark, unmark } => commands::opportunities::execute(
            mark.as_deref(),
            unmark.as_deref(),
            cli.data_dir.as_deref(),
        ),
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("kestrel_cli=debug,kestrel_core=debug,kestrel_client=debug")
    } else {
        EnvFilter::new("kestrel_cli=info,kestrel_core=info,kestrel_client=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
