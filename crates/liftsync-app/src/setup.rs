use std::sync::Arc;

use anyhow::Result;
use liftsync_core::config::AppConfig;
use liftsync_core::StaticSession;
use liftsync_db::file::FileStore;
use liftsync_db::LocalStore;
use liftsync_engine::WorkoutService;
use liftsync_remote::{HttpConnectivity, RestRemote};

pub async fn create_service(config: &AppConfig) -> Result<WorkoutService> {
    let kv = FileStore::open(&config.storage.dir).await?;
    let store = LocalStore::new(Arc::new(kv));
    let connectivity = Arc::new(HttpConnectivity::new(&config.remote, &config.sync));
    let session = Arc::new(StaticSession::new(config.session.user_id.trim()));

    let mut service = WorkoutService::new(store, connectivity, session)
        .verify_writes(config.storage.verify_writes);

    if config.remote.is_enabled() {
        match RestRemote::from_config(&config.remote) {
            Ok(remote) => {
                let remote = remote.with_access_token(config.session.access_token());
                service = service.with_remote(Arc::new(remote));
            }
            Err(e) => tracing::warn!("Remote sync disabled: {e}"),
        }
    }
    Ok(service)
}
