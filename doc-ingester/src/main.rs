use dotenv::dotenv;
use tracing::info;

use doc_ingester::{logging, Dependencies, IngesterConfig, IngesterError};

#[tokio::main]
async fn main() -> Result<(), IngesterError> {
    dotenv().ok();

    let config = IngesterConfig::from_env()?;
    logging::init(config.log_format);

    let dependencies = Dependencies::new(config).await?;
    let stats = dependencies.orchestrator(tokio::io::stdin()).run().await;

    info!(
        batches = stats.batches,
        messages = stats.messages,
        failed = stats.failed,
        "Document ingester stopped"
    );
    Ok(())
}
