//! Periodic background work: purging expired login tokens and re-deriving
//! maintenance notifications.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::service::{AuthService, NotificationService};

/// Deletes expired tokens every `period`. A zero period disables the job.
pub fn spawn_token_sweeper(auth: AuthService, period: Duration) -> Option<JoinHandle<()>> {
    if period.is_zero() {
        tracing::info!("Token sweeper disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match auth.sweep_expired(Utc::now()) {
                Ok(0) => {}
                Ok(removed) => tracing::info!("Removed {removed} expired tokens"),
                Err(e) => tracing::error!("Token sweep failed: {e}"),
            }
        }
    }))
}

/// Runs the notification sweep every `period`, starting immediately. A zero
/// period disables the job.
pub fn spawn_notification_sweeper(
    notifications: Arc<NotificationService>,
    period: Duration,
) -> Option<JoinHandle<()>> {
    if period.is_zero() {
        tracing::info!("Notification sweeper disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match notifications.sweep(Utc::now().date_naive()).await {
                Ok(report) => tracing::info!(
                    inserted = report.inserted,
                    updated = report.updated,
                    deleted = report.deleted,
                    submitted = report.submitted_inserted,
                    "Notification sweep finished"
                ),
                Err(e) => tracing::error!("Notification sweep failed: {e}"),
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::auth::{CredentialHasher, JwtService};
    use crate::service::test_support::open_store;
    use crate::types::StoredToken;

    #[tokio::test]
    async fn test_zero_period_disables_jobs() {
        let (_temp, store) = open_store();
        let auth = AuthService::new(
            store.clone(),
            JwtService::new("secret"),
            Arc::new(CredentialHasher::new()),
        );
        assert!(spawn_token_sweeper(auth, Duration::ZERO).is_none());
        assert!(
            spawn_notification_sweeper(Arc::new(NotificationService::new(store)), Duration::ZERO)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_token_sweeper_runs_on_start() {
        let (_temp, store) = open_store();
        let now = Utc::now();
        store
            .insert_token(&StoredToken {
                token: "stale".to_string(),
                created_at: now - ChronoDuration::hours(80),
                exp_token: now - ChronoDuration::hours(8),
            })
            .unwrap();
        store
            .insert_token(&StoredToken {
                token: "fresh".to_string(),
                created_at: now,
                exp_token: now + ChronoDuration::hours(72),
            })
            .unwrap();

        let auth = AuthService::new(
            store.clone(),
            JwtService::new("secret"),
            Arc::new(CredentialHasher::new()),
        );
        let handle = spawn_token_sweeper(auth, Duration::from_secs(3600)).unwrap();

        for _ in 0..50 {
            if store.get_token("stale").unwrap().is_none() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(store.get_token("stale").unwrap().is_none());
        assert!(store.get_token("fresh").unwrap().is_some());
    }
}
