mod cli;
mod infra;
mod routes;
mod scorecard;
mod server;

use health_risk::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
