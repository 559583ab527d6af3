use crate::demo::{run_demo, run_search, DemoArgs, SearchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use jobtrackr::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "JobTrackr",
    about = "Serve and explore the JobTrackr gamification and job-title search APIs",
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
    /// Rank catalog job titles against a query and print the matches
    Search(SearchArgs),
    /// Replay a week of job hunting through the gamification engine
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Replay a week of demo job hunting for this user before serving. The activity
    /// store is in-memory and otherwise empty, so `/activity` alone only moves points
    /// and streaks.
    #[arg(long)]
    pub(crate) seed_user: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Search(args) => run_search(args),
        Command::Demo(args) => run_demo(args),
    }
}
