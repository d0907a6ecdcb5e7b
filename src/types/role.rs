use serde::{Deserialize, Serialize};

/// How far a caller's visibility extends over assets, submissions and
/// notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// No implicit filter.
    Global,
    /// Restricted to rows belonging to one area.
    Area(i64),
    /// Restricted to rows belonging to one outlet.
    Outlet(i64),
}

/// Which location column a role is confined to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Area,
    Outlet,
}

/// Roles with a fixed id in the seeded `roles` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownRole {
    Administrator,
    Director,
    GeneralAffair,
    Finance,
    AreaManager,
    OutletStaff,
}

impl KnownRole {
    pub const ALL: [KnownRole; 6] = [
        KnownRole::Administrator,
        KnownRole::Director,
        KnownRole::GeneralAffair,
        KnownRole::Finance,
        KnownRole::AreaManager,
        KnownRole::OutletStaff,
    ];

    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            KnownRole::Administrator => 1,
            KnownRole::Director => 2,
            KnownRole::GeneralAffair => 3,
            KnownRole::Finance => 4,
            KnownRole::AreaManager => 5,
            KnownRole::OutletStaff => 6,
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            KnownRole::Administrator => "Administrator",
            KnownRole::Director => "Direktur",
            KnownRole::GeneralAffair => "General Affair",
            KnownRole::Finance => "Finance",
            KnownRole::AreaManager => "Area Manager",
            KnownRole::OutletStaff => "Outlet Staff",
        }
    }

    #[must_use]
    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.id() == id)
    }
}

/// Role to scope rule. Roles absent from the table see everything.
const SCOPING_RULES: &[(KnownRole, ScopeKind)] = &[
    (KnownRole::AreaManager, ScopeKind::Area),
    (KnownRole::OutletStaff, ScopeKind::Outlet),
];

#[must_use]
pub fn scope_kind(role_id: i64) -> ScopeKind {
    SCOPING_RULES
        .iter()
        .find(|(role, _)| role.id() == role_id)
        .map_or(ScopeKind::Global, |(_, kind)| *kind)
}

impl Scope {
    /// Resolves the effective scope for a caller. A scoped role without the
    /// matching location id falls back to global visibility.
    #[must_use]
    pub fn resolve(role_id: i64, area_id: Option<i64>, outlet_id: Option<i64>) -> Scope {
        match scope_kind(role_id) {
            ScopeKind::Area => area_id.filter(|id| *id != 0).map_or(Scope::Global, Scope::Area),
            ScopeKind::Outlet => outlet_id
                .filter(|id| *id != 0)
                .map_or(Scope::Global, Scope::Outlet),
            ScopeKind::Global => Scope::Global,
        }
    }

    /// Returns a SQL predicate over `{alias}.area_id` / `{alias}.outlet_id`
    /// and its bound value, or `None` when unrestricted.
    #[must_use]
    pub fn sql_predicate(&self, alias: &str) -> Option<(String, i64)> {
        match self {
            Scope::Global => None,
            Scope::Area(id) => Some((format!("{alias}.area_id = ?"), *id)),
            Scope::Outlet(id) => Some((format!("{alias}.outlet_id = ?"), *id)),
        }
    }
}
