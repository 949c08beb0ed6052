mod cli;
mod infra;
mod inspect;
mod routes;
mod server;

use sscs_hearings::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
