mod cli;
mod infra;
mod operator;
mod routes;
mod server;

use rental_leads::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
