//! Background eviction of expired sessions and drafts.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::lifecycle::Components;

/// Purge expired verification sessions and agreement drafts every `every`
/// until `shutdown` fires.
pub fn spawn_sweeper(
    components: &Components,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    let sessions = components.sessions.clone();
    let drafts = components.drafts.clone();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let sessions_purged = sessions.purge_expired();
                    let drafts_purged = drafts.purge_expired();
                    if sessions_purged + drafts_purged > 0 {
                        tracing::debug!(
                            sessions = sessions_purged,
                            drafts = drafts_purged,
                            "Purged expired entries"
                        );
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::lifecycle::Shutdown;
    use crate::store::collections;
    use crate::HttpServer;
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_purges_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let components = Components::in_memory(dir.path(), "/media");
        let key = components
            .store
            .insert(
                collections::PROPERTIES,
                json!({"id": "H-1", "title": "Loft", "price": 1000})
                    .as_object()
                    .cloned()
                    .unwrap(),
            )
            .await
            .unwrap();

        let server = HttpServer::new(AppConfig::default(), components.clone()).unwrap();
        let services = server.state().services();
        services.identity.start_session();
        services.agreements.open_draft(Some(&key)).await.unwrap();

        let shutdown = Shutdown::new();
        let handle = spawn_sweeper(&components, Duration::from_secs(60), shutdown.subscribe());

        tokio::time::sleep(Duration::from_secs(31 * 60)).await;
        assert!(components.sessions.is_empty());
        assert_eq!(components.drafts.len(), 1);

        tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
        assert!(components.drafts.is_empty());

        shutdown.trigger();
        handle.await.unwrap();
    }
}
