use crate::commands::{
    run_classify, run_encode, run_evaluate, run_quote, ClassifyArgs, EncodeArgs, EvaluateArgs,
    QuoteArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use part_pricing::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Part Pricing",
    about = "Price packaging parts against the trained cost-compliance model",
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
    /// Fetch a part from the part API and print its quote
    Quote(QuoteArgs),
    /// Classify a raw part record read from a JSON file
    Classify(ClassifyArgs),
    /// Price a raw part record read from a JSON file
    Evaluate(EvaluateArgs),
    /// One-hot encode a training CSV export
    Encode(EncodeArgs),
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
        Command::Quote(args) => run_quote(args).await,
        Command::Classify(args) => run_classify(args),
        Command::Evaluate(args) => run_evaluate(args),
        Command::Encode(args) => run_encode(args),
    }
}
