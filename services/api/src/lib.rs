mod cli;
mod infra;
mod routes;
mod server;

use fund_allocator::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
