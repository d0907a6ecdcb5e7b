pub const SCHEMA: &str = r#"
-- Reference data
CREATE TABLE IF NOT EXISTS areas (
    area_id INTEGER PRIMARY KEY AUTOINCREMENT,
    area_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS outlets (
    outlet_id INTEGER PRIMARY KEY AUTOINCREMENT,
    outlet_name TEXT NOT NULL
);

-- An outlet belongs to at most one area
CREATE TABLE IF NOT EXISTS area_outlets (
    area_id INTEGER NOT NULL REFERENCES areas(area_id) ON DELETE CASCADE,
    outlet_id INTEGER NOT NULL UNIQUE REFERENCES outlets(outlet_id) ON DELETE CASCADE,
    PRIMARY KEY (area_id, outlet_id)
);

CREATE TABLE IF NOT EXISTS roles (
    role_id INTEGER PRIMARY KEY AUTOINCREMENT,
    role_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS positions (
    position_id INTEGER PRIMARY KEY AUTOINCREMENT,
    position_name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS personal_responsibles (
    personal_responsible_id INTEGER PRIMARY KEY AUTOINCREMENT,
    personal_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS maintenance_periods (
    period_id INTEGER PRIMARY KEY AUTOINCREMENT,
    period_name TEXT NOT NULL,
    period_months INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS classifications (
    classification_id INTEGER PRIMARY KEY AUTOINCREMENT,
    classification_name TEXT NOT NULL,
    classification_economic_value INTEGER NOT NULL,
    maintenance_period_id INTEGER REFERENCES maintenance_periods(period_id) ON DELETE SET NULL,
    asset_healthy_param TEXT
);

-- Assets
CREATE TABLE IF NOT EXISTS assets (
    asset_id INTEGER PRIMARY KEY AUTOINCREMENT,
    asset_id_hash TEXT UNIQUE,
    asset_name TEXT NOT NULL,
    asset_brand TEXT NOT NULL DEFAULT '',
    asset_specification TEXT NOT NULL DEFAULT '',
    asset_classification INTEGER NOT NULL REFERENCES classifications(classification_id),
    asset_condition TEXT NOT NULL DEFAULT '',
    asset_pic INTEGER REFERENCES roles(role_id) ON DELETE SET NULL,
    personal_responsible TEXT NOT NULL DEFAULT '',
    asset_purchase_date TEXT NOT NULL,
    asset_maintenance_date TEXT NOT NULL,
    asset_status TEXT NOT NULL,
    classification_acquisition_value INTEGER NOT NULL DEFAULT 0,
    classification_last_book_value INTEGER NOT NULL DEFAULT 0,
    deprecation_value INTEGER NOT NULL DEFAULT 0,
    asset_image TEXT,
    outlet_id INTEGER REFERENCES outlets(outlet_id) ON DELETE SET NULL,
    area_id INTEGER REFERENCES areas(area_id) ON DELETE SET NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Status audit trail
CREATE TABLE IF NOT EXISTS asset_updates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    asset_id INTEGER NOT NULL REFERENCES assets(asset_id) ON DELETE CASCADE,
    asset_status TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Submissions
CREATE TABLE IF NOT EXISTS submission_parents (
    submission_parent_id INTEGER PRIMARY KEY AUTOINCREMENT,
    nip TEXT NOT NULL,
    outlet_id INTEGER REFERENCES outlets(outlet_id) ON DELETE SET NULL,
    area_id INTEGER REFERENCES areas(area_id) ON DELETE SET NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS submissions (
    submission_id INTEGER PRIMARY KEY AUTOINCREMENT,
    submission_name TEXT NOT NULL,
    submission_outlet TEXT NOT NULL DEFAULT '',
    submission_area TEXT NOT NULL DEFAULT '',
    submission_date TEXT NOT NULL,
    submission_category TEXT NOT NULL,
    submission_status TEXT NOT NULL,
    submission_purpose TEXT NOT NULL DEFAULT '',
    submission_quantity INTEGER NOT NULL DEFAULT 0,
    submission_asset_name TEXT NOT NULL,
    submission_description TEXT NOT NULL DEFAULT '',
    nip TEXT NOT NULL,
    asset_id INTEGER NOT NULL REFERENCES assets(asset_id) ON DELETE CASCADE,
    attachment TEXT,
    submission_pr_name TEXT NOT NULL DEFAULT '',
    submission_role_name TEXT NOT NULL DEFAULT '',
    outlet_id INTEGER REFERENCES outlets(outlet_id) ON DELETE SET NULL,
    area_id INTEGER REFERENCES areas(area_id) ON DELETE SET NULL,
    submission_price INTEGER NOT NULL DEFAULT 0,
    submission_parent_id INTEGER REFERENCES submission_parents(submission_parent_id) ON DELETE SET NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS submission_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    submission_id INTEGER NOT NULL REFERENCES submissions(submission_id) ON DELETE CASCADE,
    status TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    pr_name TEXT NOT NULL DEFAULT '',
    created_at TEXT DEFAULT (datetime('now'))
);

-- Derived by the notification sweep
CREATE TABLE IF NOT EXISTS notifications (
    id_notification INTEGER PRIMARY KEY AUTOINCREMENT,
    asset_id INTEGER NOT NULL REFERENCES assets(asset_id) ON DELETE CASCADE,
    submission_id INTEGER REFERENCES submissions(submission_id) ON DELETE CASCADE,
    status TEXT NOT NULL CHECK (status IN ('waiting', 'late', 'submitted')),
    asset_name TEXT NOT NULL,
    outlet_id INTEGER,
    area_id INTEGER,
    maintenance_or_submitted TEXT NOT NULL
);

-- Users and sessions
CREATE TABLE IF NOT EXISTS users (
    nip TEXT PRIMARY KEY,
    user_full_name TEXT NOT NULL,
    user_email TEXT NOT NULL,
    user_password TEXT NOT NULL,
    role_id INTEGER NOT NULL REFERENCES roles(role_id),
    area_id INTEGER REFERENCES areas(area_id) ON DELETE SET NULL,
    outlet_id INTEGER REFERENCES outlets(outlet_id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS token_stores (
    token TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    exp_token TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_assets_classification ON assets(asset_classification);
CREATE INDEX IF NOT EXISTS idx_assets_outlet ON assets(outlet_id);
CREATE INDEX IF NOT EXISTS idx_assets_area ON assets(area_id);
CREATE INDEX IF NOT EXISTS idx_asset_updates_asset ON asset_updates(asset_id);
CREATE INDEX IF NOT EXISTS idx_submissions_asset ON submissions(asset_id);
CREATE INDEX IF NOT EXISTS idx_submissions_parent ON submissions(submission_parent_id);
CREATE INDEX IF NOT EXISTS idx_submission_logs_submission ON submission_logs(submission_id);
CREATE INDEX IF NOT EXISTS idx_notifications_asset ON notifications(asset_id);
CREATE INDEX IF NOT EXISTS idx_token_stores_exp ON token_stores(exp_token);
"#;
