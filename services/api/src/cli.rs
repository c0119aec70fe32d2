use crate::operator::{run_analyze, run_ingest, AnalyzeArgs, IngestArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use retention_agent::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Retention Agent",
    about = "Score customer churn risk and pick retention offers",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run the retention pipeline once and print the decision report
    Analyze(AnalyzeArgs),
    /// Embed complaint transcripts into the knowledge snapshot
    Ingest(IngestArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Analyze(args) => run_analyze(args),
        Command::Ingest(args) => run_ingest(args),
    }
}
