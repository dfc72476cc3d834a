use std::sync::Arc;

use hyperevm_indexer::application::scanner::WalletScanner;
use hyperevm_indexer::config::AppConfig;
use hyperevm_indexer::domain::models::{ScanProgressUpdate, ScanStatus};
use hyperevm_indexer::domain::store::IndexerStore;
use hyperevm_indexer::infrastructure::persistence::{DbPool, RepositoryFactory, SqlStore};
use hyperevm_indexer::infrastructure::rpc::{EndpointRotator, RpcClient};
use hyperevm_indexer::utils::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logger();

    let config = AppConfig::from_env();
    let db_pool = DbPool::new(&config).await?;
    let repositories = RepositoryFactory::create_repositories(&db_pool);
    let store: Arc<dyn IndexerStore> = Arc::new(SqlStore::new(repositories));

    let rotator = Arc::new(
        EndpointRotator::new(config.endpoints.clone(), config.rpc.clone())
            .with_store(store.clone()),
    );
    let chain = Arc::new(RpcClient::new(rotator, config.rpc.clone()));

    let scanner = WalletScanner::new(chain, store.clone(), config.scanner.clone());

    tokio::select! {
        result = scanner.scan_all() => {
            if let Err(e) = result {
                logging::log_error(&format!("Scan failed: {}", e));
                store
                    .update_scan_progress(ScanProgressUpdate::status_only(ScanStatus::Error))
                    .await?;
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            logging::log_warning("Scan interrupted");
            store
                .update_scan_progress(ScanProgressUpdate::status_only(ScanStatus::Interrupted))
                .await?;
        }
    }

    Ok(())
}
