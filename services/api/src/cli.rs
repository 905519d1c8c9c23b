use crate::demo::{run_chart, run_demo, run_stats_report, ChartArgs, DemoArgs, StatsReportArgs};
use crate::server;
use barnehage::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Municipal Kindergarten Reporter",
    about = "Run the kindergarten coverage statistics and day-care intake demo from the command line",
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
    /// Derive coverage statistics from the source workbook
    Stats {
        #[command(subcommand)]
        command: StatsCommand,
    },
    /// Run an end-to-end intake demo against the facility roster
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum StatsCommand {
    /// Print max/min/average figures for the cleaned coverage table
    Report(StatsReportArgs),
    /// Write a standalone, browser-viewable chart document
    Chart(ChartArgs),
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
        Command::Stats {
            command: StatsCommand::Report(args),
        } => run_stats_report(args),
        Command::Stats {
            command: StatsCommand::Chart(args),
        } => run_chart(args),
        Command::Demo(args) => run_demo(args),
    }
}
