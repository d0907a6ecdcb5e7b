use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use super::{require_text, resolve_page};
use crate::auth::CredentialHasher;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Page, PageRequest, User, UserDetail};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub nip: String,
    pub user_full_name: String,
    #[serde(default)]
    pub user_email: String,
    pub user_password: String,
    pub role_id: i64,
    #[serde(default)]
    pub area_id: Option<i64>,
    #[serde(default)]
    pub outlet_id: Option<i64>,
}

/// Partial user update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub user_full_name: Option<String>,
    pub user_email: Option<String>,
    pub user_password: Option<String>,
    pub role_id: Option<i64>,
    pub area_id: Option<i64>,
    pub outlet_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQuery {
    pub q: Option<String>,
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    hasher: Arc<CredentialHasher>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<CredentialHasher>) -> Self {
        Self { store, hasher }
    }

    fn ensure_role(&self, role_id: i64) -> Result<()> {
        if self.store.get_role(role_id)?.is_none() {
            return Err(Error::not_found(format!("Role {role_id} not found")));
        }
        Ok(())
    }

    pub fn create(&self, req: CreateUser) -> Result<UserDetail> {
        require_text(&req.nip, "nip")?;
        require_text(&req.user_full_name, "user_full_name")?;
        require_text(&req.user_password, "user_password")?;
        self.ensure_role(req.role_id)?;

        let user = User {
            user_password: self.hasher.hash(&req.user_password)?,
            nip: req.nip,
            user_full_name: req.user_full_name,
            user_email: req.user_email,
            role_id: req.role_id,
            area_id: req.area_id,
            outlet_id: req.outlet_id,
        };
        self.store.create_user(&user)?;
        info!("Created user {} with role {}", user.nip, user.role_id);

        self.get(&user.nip)
    }

    pub fn get(&self, nip: &str) -> Result<UserDetail> {
        self.store
            .get_user(nip)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    pub fn update(&self, nip: &str, patch: UserPatch) -> Result<UserDetail> {
        let mut user = self
            .store
            .get_user_credentials(nip)?
            .ok_or_else(|| Error::not_found("User not found"))?;

        if let Some(name) = patch.user_full_name {
            require_text(&name, "user_full_name")?;
            user.user_full_name = name;
        }
        if let Some(email) = patch.user_email {
            user.user_email = email;
        }
        if let Some(password) = patch.user_password {
            require_text(&password, "user_password")?;
            user.user_password = self.hasher.hash(&password)?;
        }
        if let Some(role_id) = patch.role_id {
            self.ensure_role(role_id)?;
            user.role_id = role_id;
        }
        if let Some(area_id) = patch.area_id {
            user.area_id = Some(area_id);
        }
        if let Some(outlet_id) = patch.outlet_id {
            user.outlet_id = Some(outlet_id);
        }

        self.store.update_user(&user)?;
        info!("Updated user {nip}");
        self.get(nip)
    }

    pub fn delete(&self, nip: &str) -> Result<()> {
        if !self.store.delete_user(nip)? {
            return Err(Error::not_found("User not found"));
        }
        info!("Deleted user {nip}");
        Ok(())
    }

    pub fn list(&self, query: &UserQuery) -> Result<(Page<UserDetail>, PageRequest)> {
        let page = resolve_page(query.page_number, query.page_size)?;
        Ok((self.store.list_users(query.q.as_deref(), page)?, page))
    }
}
