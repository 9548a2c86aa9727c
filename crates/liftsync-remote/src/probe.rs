use std::time::Duration;

use async_trait::async_trait;
use liftsync_core::config::{RemoteConfig, SyncConfig};
use liftsync_core::Connectivity;

/// Connectivity gate that probes the remote API endpoint.
///
/// Any HTTP response, including 4xx, counts as online: the network path works
/// even if the request itself was rejected. Transport errors count as offline.
pub struct HttpConnectivity {
    probe_url: Option<String>,
    force_offline: bool,
    client: reqwest::Client,
}

impl HttpConnectivity {
    pub fn new(remote: &RemoteConfig, sync: &SyncConfig) -> Self {
        let probe_url = remote.is_enabled().then(|| {
            format!(
                "{}{}",
                remote.base_url.trim().trim_end_matches('/'),
                sync.probe_path
            )
        });
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(remote.timeout_secs.clamp(1, 5)))
            .build()
            .unwrap_or_default();
        Self {
            probe_url,
            force_offline: sync.force_offline,
            client,
        }
    }
}

#[async_trait]
impl Connectivity for HttpConnectivity {
    async fn is_online(&self) -> bool {
        if self.force_offline {
            return false;
        }
        let Some(url) = &self.probe_url else {
            return false;
        };
        match self.client.head(url).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("Connectivity probe to {url} failed: {e}");
                false
            }
        }
    }
}
