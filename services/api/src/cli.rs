use crate::scorecard::{list_questions, run_scorecard, QuestionsArgs, ScorecardArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use health_risk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Health Risk Assessment",
    about = "Score wellness questionnaires and serve employee health reports",
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
    /// Score a JSON file of pre-weighted answers and print the section breakdown
    Score(ScorecardArgs),
    /// Print the standard questionnaire
    Questions(QuestionsArgs),
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
        Command::Score(args) => run_scorecard(args),
        Command::Questions(args) => list_questions(args),
    }
}
