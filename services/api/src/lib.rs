mod cli;
mod infra;
mod operator;
mod routes;
mod server;

use retention_agent::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
