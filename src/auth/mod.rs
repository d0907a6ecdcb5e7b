mod helpers;
mod jwt;
mod middleware;
mod password;

pub use helpers::{PUBLIC_PATHS, is_public_path};
pub use jwt::{Caller, Claims, JwtService, TOKEN_TTL_HOURS};
pub use middleware::{AuthError, BearerToken, require_auth};
pub use password::CredentialHasher;
