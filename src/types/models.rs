use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Scope;

/// Asset status meaning "in good condition". Only assets in this state accept
/// new submissions, and moving back to it re-arms the maintenance schedule.
pub const GOOD_STATUS: &str = "Baik";

/// Classification id that the asset list treats as its own partition.
pub const PERKAP_CLASSIFICATION_ID: i64 = 9;

/// Log status written when a submission is first filed.
pub const SUBMITTED_LOG_STATUS: &str = "Diajukan";

/// Submission categories reported with per-category totals.
pub const SUBMISSION_CATEGORIES: [&str; 4] = [
    "Pengabaian Kondisi Aset",
    "Laporan Barang Hilang",
    "Pengajuan Service",
    "Pengajuan Ganti",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub area_id: i64,
    pub area_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outlet {
    pub outlet_id: i64,
    pub outlet_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub role_id: i64,
    pub role_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub position_id: i64,
    pub position_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalResponsible {
    pub personal_responsible_id: i64,
    pub personal_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenancePeriod {
    pub period_id: i64,
    pub period_name: String,
    pub period_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub classification_id: i64,
    pub classification_name: String,
    pub classification_economic_value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_period_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_healthy_param: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClassification {
    pub classification_name: String,
    pub classification_economic_value: i64,
    pub maintenance_period_id: Option<i64>,
    pub asset_healthy_param: Option<String>,
}

/// A classification joined with its maintenance period.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationDetail {
    #[serde(flatten)]
    pub classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_period_name: Option<String>,
    /// Zero when the classification has no maintenance period.
    pub period_months: u32,
}

impl ClassificationDetail {
    /// Splits the comma-separated healthy parameters into `param_1..param_n`.
    #[must_use]
    pub fn healthy_params(&self) -> BTreeMap<String, String> {
        parse_healthy_params(self.classification.asset_healthy_param.as_deref())
    }
}

#[must_use]
pub fn parse_healthy_params(raw: Option<&str>) -> BTreeMap<String, String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .enumerate()
            .map(|(i, p)| (format!("param_{}", i + 1), p.to_string()))
            .collect()
    })
    .unwrap_or_default()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id_hash: Option<String>,
    pub asset_name: String,
    pub asset_brand: String,
    pub asset_specification: String,
    pub asset_classification: i64,
    pub asset_condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_pic: Option<i64>,
    pub personal_responsible: String,
    pub asset_purchase_date: NaiveDate,
    pub asset_maintenance_date: NaiveDate,
    pub asset_status: String,
    pub classification_acquisition_value: i64,
    pub classification_last_book_value: i64,
    pub deprecation_value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlet_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// An asset row before it has an id. Derived values are already computed.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub asset_name: String,
    pub asset_brand: String,
    pub asset_specification: String,
    pub asset_classification: i64,
    pub asset_condition: String,
    pub asset_pic: Option<i64>,
    pub personal_responsible: String,
    pub asset_purchase_date: NaiveDate,
    pub asset_maintenance_date: NaiveDate,
    pub asset_status: String,
    pub classification_acquisition_value: i64,
    pub classification_last_book_value: i64,
    pub deprecation_value: i64,
    pub asset_image: Option<String>,
    pub outlet_id: Option<i64>,
    pub area_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Asset with its display names joined in.
#[derive(Debug, Clone, Serialize)]
pub struct AssetDetail {
    #[serde(flatten)]
    pub asset: Asset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlet_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_pic_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_classification_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_period_name: Option<String>,
}

/// Partial asset update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetPatch {
    pub asset_name: Option<String>,
    pub asset_brand: Option<String>,
    pub asset_specification: Option<String>,
    pub asset_classification: Option<i64>,
    pub asset_condition: Option<String>,
    pub asset_pic: Option<i64>,
    pub personal_responsible: Option<String>,
    pub asset_purchase_date: Option<String>,
    pub asset_status: Option<String>,
    pub classification_acquisition_value: Option<i64>,
    pub asset_image: Option<String>,
    pub outlet_id: Option<i64>,
    pub area_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetUpdate {
    pub id: i64,
    pub asset_id: i64,
    pub asset_status: String,
    pub created_at: DateTime<Utc>,
}

/// Which side of the perkap partition an asset listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetPartition {
    Perkap,
    #[default]
    General,
}

impl AssetPartition {
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("perkap") => AssetPartition::Perkap,
            _ => AssetPartition::General,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssetFilter {
    pub q: Option<String>,
    pub scope: Scope,
    pub partition: AssetPartition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub submission_id: i64,
    pub submission_name: String,
    pub submission_outlet: String,
    pub submission_area: String,
    pub submission_date: NaiveDate,
    pub submission_category: String,
    pub submission_status: String,
    pub submission_purpose: String,
    pub submission_quantity: i64,
    pub submission_asset_name: String,
    pub submission_description: String,
    pub nip: String,
    pub asset_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    pub submission_pr_name: String,
    pub submission_role_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlet_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<i64>,
    pub submission_price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub submission_name: String,
    pub submission_outlet: String,
    pub submission_area: String,
    pub submission_date: NaiveDate,
    pub submission_category: String,
    pub submission_status: String,
    pub submission_purpose: String,
    pub submission_quantity: i64,
    pub submission_asset_name: String,
    pub submission_description: String,
    pub nip: String,
    pub asset_id: i64,
    pub attachment: Option<String>,
    pub submission_pr_name: String,
    pub submission_role_name: String,
    pub outlet_id: Option<i64>,
    pub area_id: Option<i64>,
    pub submission_price: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionLog {
    pub id: i64,
    pub submission_id: i64,
    pub status: String,
    pub description: String,
    pub pr_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
    pub q: Option<String>,
    pub scope: Option<Scope>,
    pub area_id: Option<i64>,
    pub outlet_id: Option<i64>,
    pub submission_parent_id: Option<i64>,
    /// `true` lists only grouped submissions, `false` only ungrouped ones.
    pub grouped: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionParent {
    pub submission_parent_id: i64,
    pub nip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlet_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlet_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubmissionParent {
    pub nip: String,
    pub outlet_id: Option<i64>,
    pub area_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionParentFilter {
    pub q: Option<String>,
    pub nip: Option<String>,
    pub scope: Option<Scope>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Waiting,
    Late,
    Submitted,
}

impl NotificationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            NotificationStatus::Waiting => "waiting",
            NotificationStatus::Late => "late",
            NotificationStatus::Submitted => "submitted",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "waiting" => Some(NotificationStatus::Waiting),
            "late" => Some(NotificationStatus::Late),
            "submitted" => Some(NotificationStatus::Submitted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id_notification: i64,
    pub asset_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<i64>,
    pub status: NotificationStatus,
    pub asset_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlet_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<i64>,
    pub maintenance_or_submitted: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub asset_id: i64,
    pub submission_id: Option<i64>,
    pub status: NotificationStatus,
    pub asset_name: String,
    pub outlet_id: Option<i64>,
    pub area_id: Option<i64>,
    pub maintenance_or_submitted: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotificationCounts {
    pub total_waiting: i64,
    pub total_late: i64,
    pub total_submitted: i64,
}

impl NotificationCounts {
    #[must_use]
    pub fn total(&self) -> i64 {
        self.total_waiting + self.total_late + self.total_submitted
    }
}

/// A user row including the password hash. Never serialized.
#[derive(Debug, Clone)]
pub struct User {
    pub nip: String,
    pub user_full_name: String,
    pub user_email: String,
    pub user_password: String,
    pub role_id: i64,
    pub area_id: Option<i64>,
    pub outlet_id: Option<i64>,
}

/// Public view of a user with the role name joined in.
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    pub nip: String,
    pub user_full_name: String,
    pub user_email: String,
    pub role_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlet_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct StoredToken {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub exp_token: DateTime<Utc>,
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: i64,
    pub size: i64,
}

impl PageRequest {
    pub const DEFAULT_NUMBER: i64 = 1;
    pub const DEFAULT_SIZE: i64 = 10;
    pub const MAX_SIZE: i64 = 100;

    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }

    /// Token pointing at the following page, present only when rows remain.
    #[must_use]
    pub fn next_page_token(&self, total: i64) -> Option<String> {
        (total > self.number * self.size).then(|| format!("page_token_{}", self.number + 1))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            number: Self::DEFAULT_NUMBER,
            size: Self::DEFAULT_SIZE,
        }
    }
}

/// One page of rows and the total number of rows matching the filter.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_params_split_by_position() {
        let params = parse_healthy_params(Some("Layar menyala, Baterai awet,,Tidak retak"));
        assert_eq!(params.len(), 3);
        assert_eq!(params["param_1"], "Layar menyala");
        assert_eq!(params["param_2"], "Baterai awet");
        assert_eq!(params["param_3"], "Tidak retak");
        assert!(parse_healthy_params(None).is_empty());
    }

    #[test]
    fn test_next_page_token() {
        let page = PageRequest { number: 2, size: 10 };
        assert_eq!(page.offset(), 10);
        assert_eq!(page.next_page_token(20), None);
        assert_eq!(page.next_page_token(21), Some("page_token_3".to_string()));
    }

    #[test]
    fn test_partition_from_query() {
        assert_eq!(AssetPartition::from_query(Some("perkap")), AssetPartition::Perkap);
        assert_eq!(AssetPartition::from_query(Some("PERKAP")), AssetPartition::Perkap);
        assert_eq!(AssetPartition::from_query(Some("it")), AssetPartition::General);
        assert_eq!(AssetPartition::from_query(None), AssetPartition::General);
    }

    #[test]
    fn test_notification_counts_total() {
        let counts = NotificationCounts {
            total_waiting: 2,
            total_late: 3,
            total_submitted: 4,
        };
        assert_eq!(counts.total(), 9);
    }
}
