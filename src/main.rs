use std::sync::Arc;

use hyperevm_indexer::application::indexer::ChainMonitor;
use hyperevm_indexer::config::AppConfig;
use hyperevm_indexer::domain::store::IndexerStore;
use hyperevm_indexer::infrastructure::persistence::{DbPool, RepositoryFactory, SqlStore};
use hyperevm_indexer::infrastructure::rpc::{EndpointRotator, RpcClient};
use hyperevm_indexer::utils::logging;

#[tokio::main]
async fn main() {
    logging::init_logger();

    let config = AppConfig::from_env();
    if config.endpoints.is_empty() {
        logging::log_error("No RPC endpoints configured");
        return;
    }

    match DbPool::new(&config).await {
        Ok(db_pool) => {
            let repositories = RepositoryFactory::create_repositories(&db_pool);
            let store: Arc<dyn IndexerStore> = Arc::new(SqlStore::new(repositories));

            let rotator = Arc::new(
                EndpointRotator::new(config.endpoints.clone(), config.rpc.clone())
                    .with_store(store.clone()),
            );
            let chain = Arc::new(RpcClient::new(rotator.clone(), config.rpc.clone()));

            let monitor = ChainMonitor::new(chain, store, rotator, config.indexer.clone());

            let handle = tokio::spawn(async move {
                if let Err(e) = monitor.run().await {
                    logging::log_error(&format!("Monitor stopped: {}", e));
                }
            });

            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for Ctrl+C");
            logging::log_info("Shutting down");
            handle.abort();
        }
        Err(e) => logging::log_error(&format!("Failed to connect to database: {}", e)),
    }
}
