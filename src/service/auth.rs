use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::require_text;
use crate::auth::{Claims, CredentialHasher, JwtService};
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::StoredToken;

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub nip: String,
    pub user_full_name: String,
    pub role_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlet_id: Option<i64>,
}

/// Session handling. A token is valid only while it is both correctly signed
/// and present in the token store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    jwt: JwtService,
    hasher: Arc<CredentialHasher>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, jwt: JwtService, hasher: Arc<CredentialHasher>) -> Self {
        Self { store, jwt, hasher }
    }

    pub fn login(&self, nip: &str, password: &str, now: DateTime<Utc>) -> Result<LoginOutcome> {
        require_text(nip, "nip")?;
        let user = self
            .store
            .get_user_credentials(nip)?
            .ok_or_else(|| Error::not_found("User not found"))?;

        if !self.hasher.verify(password, &user.user_password)? {
            warn!("Failed login for {nip}");
            return Err(Error::unauthenticated("Invalid password"));
        }

        let (token, claims) = self.jwt.issue(&user, now)?;
        let expires_at = claims.expires_at();
        self.store.insert_token(&StoredToken {
            token: token.clone(),
            created_at: now,
            exp_token: expires_at,
        })?;

        info!("User {nip} logged in");
        Ok(LoginOutcome {
            token,
            expires_at,
            nip: user.nip,
            user_full_name: user.user_full_name,
            role_id: user.role_id,
            area_id: user.area_id,
            outlet_id: user.outlet_id,
        })
    }

    /// Revokes a token. Revoking an unknown token is not an error.
    pub fn logout(&self, token: &str) -> Result<()> {
        if self.store.delete_token(token)? {
            info!("Token revoked");
        } else {
            debug!("Logout for a token that was not stored");
        }
        Ok(())
    }

    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims> {
        let stored = self
            .store
            .get_token(token)?
            .ok_or_else(|| Error::unauthenticated("Token is not recognised"))?;
        if stored.exp_token <= now {
            return Err(Error::unauthenticated("Token has expired"));
        }
        self.jwt.verify(token)
    }

    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let removed = self.store.delete_expired_tokens(now)?;
        if removed > 0 {
            info!("Removed {removed} expired tokens");
        }
        Ok(removed)
    }

    /// Sets a new password for `nip`, authorised by a live token issued to
    /// that same user.
    pub fn reset_password(
        &self,
        nip: &str,
        reset_token: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        require_text(new_password, "new_password")?;
        if self.store.get_user(nip)?.is_none() {
            return Err(Error::not_found("User not found"));
        }

        let claims = self.validate(reset_token, now)?;
        if claims.sub != nip {
            warn!("Reset token for {} used against {nip}", claims.sub);
            return Err(Error::unauthenticated("Reset token does not belong to this user"));
        }

        let hash = self.hasher.hash(new_password)?;
        self.store.update_user_password(nip, &hash)?;
        info!("Password reset for {nip}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::service::test_support::open_store;
    use crate::types::{KnownRole, User};

    fn service() -> (tempfile::TempDir, Arc<dyn Store>, AuthService) {
        let (temp, store) = open_store();
        let hasher = Arc::new(CredentialHasher::new());
        for nip in ["1001", "1002"] {
            store
                .create_user(&User {
                    nip: nip.to_string(),
                    user_full_name: format!("User {nip}"),
                    user_email: format!("{nip}@example.com"),
                    user_password: hasher.hash("rahasia").unwrap(),
                    role_id: KnownRole::AreaManager.id(),
                    area_id: None,
                    outlet_id: None,
                })
                .unwrap();
        }
        let service = AuthService::new(store.clone(), JwtService::new("test-secret"), hasher);
        (temp, store, service)
    }

    #[test]
    fn test_login_failures() {
        let (_temp, _store, service) = service();
        let now = Utc::now();
        assert!(matches!(
            service.login("9999", "rahasia", now),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            service.login("1001", "salah", now),
            Err(Error::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_token_valid_until_logout() {
        let (_temp, _store, service) = service();
        let now = Utc::now();
        let outcome = service.login("1001", "rahasia", now).unwrap();
        assert_eq!(
            outcome.expires_at.timestamp(),
            (now + Duration::hours(72)).timestamp()
        );

        let claims = service.validate(&outcome.token, now).unwrap();
        assert_eq!(claims.sub, "1001");
        assert!(service.validate(&outcome.token, now + Duration::minutes(5)).is_ok());

        service.logout(&outcome.token).unwrap();
        assert!(matches!(
            service.validate(&outcome.token, now),
            Err(Error::Unauthenticated(_))
        ));
        service.logout(&outcome.token).unwrap();
    }

    #[test]
    fn test_token_expires_and_is_swept() {
        let (_temp, store, service) = service();
        let now = Utc::now();
        let outcome = service.login("1001", "rahasia", now).unwrap();

        let later = now + Duration::hours(73);
        assert!(matches!(
            service.validate(&outcome.token, later),
            Err(Error::Unauthenticated(_))
        ));
        assert_eq!(service.sweep_expired(now).unwrap(), 0);
        assert_eq!(service.sweep_expired(later).unwrap(), 1);
        assert!(store.get_token(&outcome.token).unwrap().is_none());
    }

    #[test]
    fn test_forged_token_rejected_even_if_stored() {
        let (_temp, store, service) = service();
        let now = Utc::now();
        let forged = JwtService::new("other-secret");
        let user = store.get_user_credentials("1001").unwrap().unwrap();
        let (token, claims) = forged.issue(&user, now).unwrap();
        store
            .insert_token(&StoredToken {
                token: token.clone(),
                created_at: now,
                exp_token: claims.expires_at(),
            })
            .unwrap();

        assert!(matches!(
            service.validate(&token, now),
            Err(Error::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_reset_password() {
        let (_temp, _store, service) = service();
        let now = Utc::now();
        let own = service.login("1001", "rahasia", now).unwrap();
        let other = service.login("1002", "rahasia", now).unwrap();

        assert!(matches!(
            service.reset_password("1001", &other.token, "baru", now),
            Err(Error::Unauthenticated(_))
        ));
        assert!(matches!(
            service.reset_password("9999", &own.token, "baru", now),
            Err(Error::NotFound(_))
        ));

        service.reset_password("1001", &own.token, "baru", now).unwrap();
        assert!(service.login("1001", "rahasia", now).is_err());
        assert!(service.login("1001", "baru", now).is_ok());
    }
}
