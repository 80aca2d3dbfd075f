use crate::operator::{run_preview, run_send_test, LeadArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rental_leads::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Rental lead relay",
    about = "Serve the website contact endpoint and inspect lead notifications",
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
    /// Print the notification a lead would produce, without sending it
    Preview(LeadArgs),
    /// Send a lead through the configured Telegram chat
    SendTest(LeadArgs),
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
        Command::Preview(args) => run_preview(args),
        Command::SendTest(args) => run_send_test(args).await,
    }
}
