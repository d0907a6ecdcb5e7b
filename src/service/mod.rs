//! Business operations over the [`Store`](crate::store::Store).
//!
//! Each service owns an `Arc<dyn Store>` handed in at construction. Services
//! return typed [`Error`]s and never touch HTTP; the gateway maps them.

mod asset;
mod auth;
mod notification;
mod reference;
mod submission;
mod user;

pub use asset::{AssetQuery, AssetService, AssetView, CreateAsset};
pub use auth::{AuthService, LoginOutcome};
pub use notification::{NotificationQuery, NotificationService, SweepReport};
pub use reference::{
    ClassificationView, CreateMaintenancePeriod, CreateOutlet, ReferenceService,
};
pub use submission::{
    CategoryCount, CreateSubmission, CreateSubmissionParent, SubmissionParentQuery,
    SubmissionQuery, SubmissionService, SubmissionWithLogs,
};
pub use user::{CreateUser, UserPatch, UserQuery, UserService};

use crate::error::{Error, Result};
use crate::types::PageRequest;

/// Fails with `InvalidArgument` when a required text field is blank.
pub(crate) fn require_text(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid(format!("{field} is required")));
    }
    Ok(())
}

/// Builds a page request from optional client values. Absent values take the
/// defaults; supplied values must be at least 1, and the size at most
/// [`PageRequest::MAX_SIZE`].
pub fn resolve_page(number: Option<i64>, size: Option<i64>) -> Result<PageRequest> {
    let number = number.unwrap_or(PageRequest::DEFAULT_NUMBER);
    let size = size.unwrap_or(PageRequest::DEFAULT_SIZE);

    if number < 1 {
        return Err(Error::invalid("page_number must be at least 1"));
    }
    if size < 1 {
        return Err(Error::invalid("page_size must be at least 1"));
    }
    if size > PageRequest::MAX_SIZE {
        return Err(Error::invalid(format!(
            "page_size cannot exceed {}",
            PageRequest::MAX_SIZE
        )));
    }

    Ok(PageRequest { number, size })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::auth::Caller;
    use crate::store::{SqliteStore, Store};
    use crate::types::NewClassification;

    pub fn open_store() -> (TempDir, Arc<dyn Store>) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (temp, Arc::new(store))
    }

    /// Creates a classification with the given economic value and maintenance
    /// period, returning its id.
    pub fn seed_classification(store: &Arc<dyn Store>, economic_value: i64, months: u32) -> i64 {
        let period = store
            .create_maintenance_period(&format!("{months} Bulan"), months)
            .unwrap();
        store
            .create_classification(&NewClassification {
                classification_name: "Elektronik".to_string(),
                classification_economic_value: economic_value,
                maintenance_period_id: Some(period.period_id),
                asset_healthy_param: None,
            })
            .unwrap()
            .classification_id
    }

    pub fn caller(role_id: i64, area_id: Option<i64>, outlet_id: Option<i64>) -> Caller {
        Caller {
            nip: "9001".to_string(),
            name: "Sari".to_string(),
            role_id,
            area_id,
            outlet_id,
        }
    }
}
