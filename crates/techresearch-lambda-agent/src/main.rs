//! Binary entry point for the research agent Lambda.

use lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    techresearch_lambda_agent::run().await
}
