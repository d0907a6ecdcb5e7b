use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::resolve_page;
use crate::auth::Caller;
use crate::error::{Error, Result};
use crate::lifecycle::{MaintenanceState, classify_maintenance};
use crate::store::Store;
use crate::types::{
    Asset, NewNotification, Notification, NotificationCounts, NotificationStatus, PageRequest,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationQuery {
    /// Substring of the asset name.
    pub q: Option<String>,
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

/// What one sweep changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub submitted_inserted: usize,
    pub unchanged: usize,
}

impl SweepReport {
    #[must_use]
    pub fn writes(&self) -> usize {
        self.inserted + self.updated + self.deleted + self.submitted_inserted
    }
}

fn maintenance_status(state: MaintenanceState) -> Option<NotificationStatus> {
    match state {
        MaintenanceState::Normal => None,
        MaintenanceState::Waiting => Some(NotificationStatus::Waiting),
        MaintenanceState::Late => Some(NotificationStatus::Late),
    }
}

/// Derives notification rows from asset maintenance dates and open
/// submissions. Sweeps never overlap.
pub struct NotificationService {
    store: Arc<dyn Store>,
    sweep_lock: Mutex<()>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            sweep_lock: Mutex::new(()),
        }
    }

    /// Brings the notification table in line with `today`. Running it twice
    /// without asset changes writes nothing the second time.
    pub async fn sweep(&self, today: NaiveDate) -> Result<SweepReport> {
        let _guard = self.sweep_lock.lock().await;
        let mut report = SweepReport::default();

        for asset in self.store.list_all_assets()? {
            self.reconcile_asset(&asset, today, &mut report)?;
        }

        for submission in self.store.list_all_submissions()? {
            if self.store.has_submitted_notification(submission.asset_id)? {
                continue;
            }
            self.store.insert_notification(&NewNotification {
                asset_id: submission.asset_id,
                submission_id: Some(submission.submission_id),
                status: NotificationStatus::Submitted,
                asset_name: submission.submission_asset_name,
                outlet_id: submission.outlet_id,
                area_id: submission.area_id,
                maintenance_or_submitted: today,
            })?;
            report.submitted_inserted += 1;
        }

        info!(
            "Notification sweep for {today}: {} inserted, {} updated, {} deleted, {} submitted, {} unchanged",
            report.inserted,
            report.updated,
            report.deleted,
            report.submitted_inserted,
            report.unchanged
        );
        Ok(report)
    }

    fn reconcile_asset(
        &self,
        asset: &Asset,
        today: NaiveDate,
        report: &mut SweepReport,
    ) -> Result<()> {
        let due = asset.asset_maintenance_date;
        let wanted = maintenance_status(classify_maintenance(due, today));
        let existing = self.store.find_maintenance_notification(asset.asset_id)?;

        match (wanted, existing) {
            (None, None) => {}
            (None, Some(row)) => {
                self.store.delete_notification(row.id_notification)?;
                report.deleted += 1;
            }
            (Some(status), None) => {
                self.store.insert_notification(&NewNotification {
                    asset_id: asset.asset_id,
                    submission_id: None,
                    status,
                    asset_name: asset.asset_name.clone(),
                    outlet_id: asset.outlet_id,
                    area_id: asset.area_id,
                    maintenance_or_submitted: due,
                })?;
                report.inserted += 1;
            }
            (Some(status), Some(row)) => {
                if row.status == status && row.maintenance_or_submitted == due {
                    report.unchanged += 1;
                } else {
                    self.store
                        .update_notification(row.id_notification, status, due)?;
                    debug!(
                        "Notification {} for asset {} now {}",
                        row.id_notification,
                        asset.asset_id,
                        status.as_str()
                    );
                    report.updated += 1;
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, id: i64) -> Result<Notification> {
        self.store
            .get_notification(id)?
            .ok_or_else(|| Error::not_found("Notification not found"))
    }

    /// One page of notifications visible to `caller` with the per-status
    /// totals under the same scope.
    pub fn list(
        &self,
        query: &NotificationQuery,
        caller: &Caller,
    ) -> Result<(Vec<Notification>, PageRequest, NotificationCounts)> {
        let page = resolve_page(query.page_number, query.page_size)?;
        let scope = caller.scope();
        let q = query.q.as_deref();
        let items = self.store.list_notifications(scope, q, page)?;
        let counts = self.store.count_notifications(scope, q)?;
        Ok((items, page, counts))
    }
}
