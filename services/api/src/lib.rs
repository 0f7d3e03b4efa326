mod cli;
mod infra;
mod routes;
mod server;

use exam_duty::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
