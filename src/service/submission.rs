use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{require_text, resolve_page};
use crate::auth::Caller;
use crate::error::{Error, Result};
use crate::mail::{MailMessage, MailQueue};
use crate::store::Store;
use crate::types::{
    GOOD_STATUS, KnownRole, NewSubmission, NewSubmissionParent, Page, PageRequest,
    SUBMISSION_CATEGORIES, SUBMITTED_LOG_STATUS, Submission, SubmissionFilter, SubmissionLog,
    SubmissionParent, SubmissionParentFilter,
};

const MISMATCH: &str = "Asset or related details do not match";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubmission {
    pub submission_name: String,
    #[serde(default)]
    pub submission_outlet: String,
    #[serde(default)]
    pub submission_area: String,
    pub submission_category: String,
    #[serde(default)]
    pub submission_status: Option<String>,
    #[serde(default)]
    pub submission_purpose: String,
    #[serde(default = "default_quantity")]
    pub submission_quantity: i64,
    pub submission_asset_name: String,
    #[serde(default)]
    pub submission_description: String,
    pub asset_id: i64,
    #[serde(default)]
    pub attachment: Option<String>,
    #[serde(default)]
    pub submission_pr_name: String,
    #[serde(default)]
    pub submission_role_name: Option<String>,
    #[serde(default)]
    pub outlet_id: Option<i64>,
    #[serde(default)]
    pub area_id: Option<i64>,
    #[serde(default)]
    pub submission_price: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionQuery {
    pub q: Option<String>,
    pub area_id: Option<i64>,
    pub outlet_id: Option<i64>,
    pub submission_parent_id: Option<i64>,
    /// Lists grouped submissions when true.
    pub parent_id: Option<bool>,
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubmissionParent {
    pub submission_ids: Vec<i64>,
    #[serde(default)]
    pub outlet_id: Option<i64>,
    #[serde(default)]
    pub area_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionParentQuery {
    pub q: Option<String>,
    pub nip: Option<String>,
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

/// Per-category totals returned alongside a submission listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub total_pengabaian_kondisi_aset: i64,
    pub total_laporan_barang_hilang: i64,
    pub total_pengajuan_service: i64,
    pub total_pengajuan_ganti: i64,
}

impl CategoryCount {
    fn from_rows(rows: Vec<(String, i64)>) -> Self {
        let mut counts = Self::default();
        for (category, total) in rows {
            let slot = match category.as_str() {
                c if c == SUBMISSION_CATEGORIES[0] => &mut counts.total_pengabaian_kondisi_aset,
                c if c == SUBMISSION_CATEGORIES[1] => &mut counts.total_laporan_barang_hilang,
                c if c == SUBMISSION_CATEGORIES[2] => &mut counts.total_pengajuan_service,
                c if c == SUBMISSION_CATEGORIES[3] => &mut counts.total_pengajuan_ganti,
                _ => continue,
            };
            *slot = total;
        }
        counts
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionWithLogs {
    #[serde(flatten)]
    pub submission: Submission,
    pub logs: Vec<SubmissionLog>,
}

#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn Store>,
    mail: MailQueue,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn Store>, mail: MailQueue) -> Self {
        Self { store, mail }
    }

    /// Files a submission against an asset in good condition whose details
    /// match what the client claims.
    pub fn create(
        &self,
        req: CreateSubmission,
        caller: &Caller,
        now: DateTime<Utc>,
    ) -> Result<Submission> {
        require_text(&req.submission_name, "submission_name")?;
        require_text(&req.submission_category, "submission_category")?;
        if req.submission_quantity < 1 {
            return Err(Error::invalid("submission_quantity must be at least 1"));
        }

        let detail = self
            .store
            .get_asset(req.asset_id)?
            .ok_or_else(|| Error::not_found("Asset not found"))?;

        let claim_matches = |claimed: &str, actual: Option<&str>| {
            claimed.is_empty() || actual == Some(claimed)
        };
        let asset = &detail.asset;
        if asset.asset_status != GOOD_STATUS
            || asset.asset_name != req.submission_asset_name
            || !claim_matches(&req.submission_outlet, detail.outlet_name.as_deref())
            || !claim_matches(&req.submission_area, detail.area_name.as_deref())
            || !claim_matches(&req.submission_pr_name, Some(asset.personal_responsible.as_str()))
        {
            warn!(
                "Rejected submission for asset {}: details do not match",
                req.asset_id
            );
            return Err(Error::not_found(MISMATCH));
        }

        let role_name = req.submission_role_name.unwrap_or_else(|| {
            KnownRole::from_id(caller.role_id)
                .map(|role| role.display_name().to_string())
                .unwrap_or_default()
        });

        let submission = NewSubmission {
            submission_name: req.submission_name,
            submission_outlet: req.submission_outlet,
            submission_area: req.submission_area,
            submission_date: now.date_naive(),
            submission_category: req.submission_category,
            submission_status: req
                .submission_status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| SUBMITTED_LOG_STATUS.to_string()),
            submission_purpose: req.submission_purpose,
            submission_quantity: req.submission_quantity,
            submission_asset_name: req.submission_asset_name,
            submission_description: req.submission_description,
            nip: caller.nip.clone(),
            asset_id: req.asset_id,
            attachment: req.attachment,
            submission_pr_name: req.submission_pr_name,
            submission_role_name: role_name,
            outlet_id: req.outlet_id.or(asset.outlet_id),
            area_id: req.area_id.or(asset.area_id),
            submission_price: req.submission_price,
            created_at: now,
        };

        let created = self.store.create_submission(&submission)?;
        info!(
            "Created submission {} for asset {}",
            created.submission_id, created.asset_id
        );

        self.notify_reviewers(&created);
        Ok(created)
    }

    /// Queues an alert to the area managers of the submission's area and to
    /// general affairs. Failures only reach the log.
    fn notify_reviewers(&self, submission: &Submission) {
        let users = match self.store.list_all_users() {
            Ok(users) => users,
            Err(e) => {
                warn!("Skipping submission mail, failed to load recipients: {e}");
                return;
            }
        };

        let to = users
            .into_iter()
            .filter(|user| {
                user.role_id == KnownRole::GeneralAffair.id()
                    || (user.role_id == KnownRole::AreaManager.id()
                        && submission.area_id.is_some()
                        && user.area_id == submission.area_id)
            })
            .map(|user| user.user_email)
            .filter(|email| !email.is_empty())
            .collect();

        self.mail.enqueue(MailMessage {
            to,
            subject: format!("Pengajuan baru: {}", submission.submission_name),
            body: format!(
                "{} mengajukan {} untuk aset {} ({}).",
                submission.submission_pr_name,
                submission.submission_category,
                submission.submission_asset_name,
                submission.submission_description
            ),
        });
    }

    pub fn update_status(
        &self,
        id: i64,
        status: &str,
        caller: &Caller,
        now: DateTime<Utc>,
    ) -> Result<Submission> {
        require_text(status, "submission_status")?;
        let submission = self
            .store
            .update_submission_status(id, status, &caller.name, now)?;
        info!("Submission {id} status set to '{status}' by {}", caller.nip);
        Ok(submission)
    }

    pub fn get(&self, id: i64) -> Result<SubmissionWithLogs> {
        let submission = self
            .store
            .get_submission(id)?
            .ok_or_else(|| Error::not_found("Submission not found"))?;
        let logs = self.store.list_submission_logs(id)?;
        Ok(SubmissionWithLogs { submission, logs })
    }

    pub fn list(
        &self,
        query: &SubmissionQuery,
        caller: &Caller,
    ) -> Result<(Page<Submission>, PageRequest, CategoryCount)> {
        let page = resolve_page(query.page_number, query.page_size)?;
        let scope = caller.scope();
        let filter = SubmissionFilter {
            q: query.q.clone(),
            scope: Some(scope),
            area_id: query.area_id,
            outlet_id: query.outlet_id,
            submission_parent_id: query.submission_parent_id,
            grouped: query.parent_id.unwrap_or(false),
        };

        let result = self.store.list_submissions(&filter, page)?;
        let counts = self
            .store
            .count_submissions_by_category(scope, &SUBMISSION_CATEGORIES)?;
        Ok((result, page, CategoryCount::from_rows(counts)))
    }

    pub fn create_parent(
        &self,
        req: CreateSubmissionParent,
        caller: &Caller,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        if req.submission_ids.is_empty() {
            return Err(Error::invalid("submission_ids cannot be empty"));
        }

        let parent = NewSubmissionParent {
            nip: caller.nip.clone(),
            outlet_id: req.outlet_id.or(caller.outlet_id),
            area_id: req.area_id.or(caller.area_id),
            created_at: now,
        };
        let id = self
            .store
            .create_submission_parent(&parent, &req.submission_ids)?;
        info!(
            "Grouped {} submissions under parent {id}",
            req.submission_ids.len()
        );
        Ok(id)
    }

    pub fn list_parents(
        &self,
        query: &SubmissionParentQuery,
        caller: &Caller,
    ) -> Result<(Page<SubmissionParent>, PageRequest)> {
        let page = resolve_page(query.page_number, query.page_size)?;
        let filter = SubmissionParentFilter {
            q: query.q.clone(),
            nip: query.nip.clone(),
            scope: Some(caller.scope()),
        };
        Ok((self.store.list_submission_parents(&filter, page)?, page))
    }
}
