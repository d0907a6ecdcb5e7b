mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;
use crate::types::*;

/// Computes the external lookup hash for a freshly assigned asset id.
pub type AssetHasher<'a> = &'a (dyn Fn(i64) -> Result<String> + Send + Sync);

/// Store defines the database interface.
///
/// Every method that writes more than one row runs inside a single
/// transaction; on error nothing is persisted.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Area and outlet operations
    fn create_area(&self, name: &str) -> Result<Area>;
    fn list_areas(&self) -> Result<Vec<Area>>;
    fn get_area(&self, id: i64) -> Result<Option<Area>>;
    fn create_outlet(&self, name: &str, area_id: Option<i64>) -> Result<Outlet>;
    fn list_outlets(&self, area_id: Option<i64>) -> Result<Vec<Outlet>>;

    // Role, position and personal responsible operations
    fn list_roles(&self) -> Result<Vec<Role>>;
    fn get_role(&self, id: i64) -> Result<Option<Role>>;
    fn create_position(&self, name: &str) -> Result<Position>;
    fn list_positions(&self) -> Result<Vec<Position>>;
    fn create_personal_responsible(&self, name: &str) -> Result<PersonalResponsible>;
    fn list_personal_responsibles(&self) -> Result<Vec<PersonalResponsible>>;

    // Maintenance period and classification operations
    fn create_maintenance_period(&self, name: &str, months: u32) -> Result<MaintenancePeriod>;
    fn list_maintenance_periods(&self) -> Result<Vec<MaintenancePeriod>>;
    fn get_maintenance_period(&self, id: i64) -> Result<Option<MaintenancePeriod>>;
    fn create_classification(&self, classification: &NewClassification) -> Result<Classification>;
    fn list_classifications(&self) -> Result<Vec<Classification>>;
    fn get_classification(&self, id: i64) -> Result<Option<ClassificationDetail>>;

    // Asset operations
    fn create_asset(&self, asset: &NewAsset, hasher: AssetHasher<'_>) -> Result<Asset>;
    fn get_asset(&self, id: i64) -> Result<Option<AssetDetail>>;
    fn get_asset_by_hash(&self, hash: &str) -> Result<Option<AssetDetail>>;
    fn list_assets(&self, filter: &AssetFilter, page: PageRequest) -> Result<Page<AssetDetail>>;
    fn list_all_assets(&self) -> Result<Vec<Asset>>;
    /// Overwrites the asset row and appends an audit entry.
    fn update_asset(&self, asset: &Asset, now: DateTime<Utc>) -> Result<()>;
    /// Sets the status (and optionally a new maintenance date) and appends an
    /// audit entry.
    fn update_asset_status(
        &self,
        id: i64,
        status: &str,
        maintenance_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<()>;
    fn delete_asset(&self, id: i64) -> Result<bool>;
    fn list_asset_updates(&self, asset_id: i64) -> Result<Vec<AssetUpdate>>;

    // Submission operations
    /// Inserts the submission and its first log entry, moves the asset to the
    /// submission category and records the audit entry.
    fn create_submission(&self, submission: &NewSubmission) -> Result<Submission>;
    fn get_submission(&self, id: i64) -> Result<Option<Submission>>;
    fn list_submissions(
        &self,
        filter: &SubmissionFilter,
        page: PageRequest,
    ) -> Result<Page<Submission>>;
    fn list_all_submissions(&self) -> Result<Vec<Submission>>;
    fn count_submissions_by_category(
        &self,
        scope: Scope,
        categories: &[&str],
    ) -> Result<Vec<(String, i64)>>;
    /// Updates the status, logs it, and cascades it to the asset.
    fn update_submission_status(
        &self,
        id: i64,
        status: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Submission>;
    fn list_submission_logs(&self, submission_id: i64) -> Result<Vec<SubmissionLog>>;
    /// Creates the parent and attaches every listed submission to it.
    fn create_submission_parent(
        &self,
        parent: &NewSubmissionParent,
        submission_ids: &[i64],
    ) -> Result<i64>;
    fn list_submission_parents(
        &self,
        filter: &SubmissionParentFilter,
        page: PageRequest,
    ) -> Result<Page<SubmissionParent>>;

    // Notification operations
    fn get_notification(&self, id: i64) -> Result<Option<Notification>>;
    /// The waiting/late notification of an asset, ignoring submitted ones.
    fn find_maintenance_notification(&self, asset_id: i64) -> Result<Option<Notification>>;
    fn has_submitted_notification(&self, asset_id: i64) -> Result<bool>;
    fn insert_notification(&self, notification: &NewNotification) -> Result<i64>;
    fn update_notification(
        &self,
        id: i64,
        status: NotificationStatus,
        date: NaiveDate,
    ) -> Result<()>;
    fn delete_notification(&self, id: i64) -> Result<bool>;
    fn list_notifications(
        &self,
        scope: Scope,
        q: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<Notification>>;
    fn count_notifications(&self, scope: Scope, q: Option<&str>) -> Result<NotificationCounts>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, nip: &str) -> Result<Option<UserDetail>>;
    fn get_user_credentials(&self, nip: &str) -> Result<Option<User>>;
    fn list_users(&self, q: Option<&str>, page: PageRequest) -> Result<Page<UserDetail>>;
    fn list_all_users(&self) -> Result<Vec<UserDetail>>;
    fn update_user(&self, user: &User) -> Result<()>;
    fn update_user_password(&self, nip: &str, password_hash: &str) -> Result<()>;
    fn delete_user(&self, nip: &str) -> Result<bool>;
    fn count_users(&self) -> Result<i64>;

    // Token store operations
    fn insert_token(&self, token: &StoredToken) -> Result<()>;
    fn get_token(&self, token: &str) -> Result<Option<StoredToken>>;
    fn delete_token(&self, token: &str) -> Result<bool>;
    fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<usize>;
}
