mod models;
mod role;

pub use models::*;
pub use role::{KnownRole, Scope, ScopeKind, scope_kind};
