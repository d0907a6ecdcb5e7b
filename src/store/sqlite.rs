use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use super::schema::SCHEMA;
use super::{AssetHasher, Store};
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

/// Fixed-width UTC timestamps so that string comparison in SQL is ordering.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn datetime_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    Ok(parse_datetime(&row.get::<_, String>(idx)?))
}

/// Accumulates `AND`-joined predicates with their positional arguments.
#[derive(Default)]
struct Conditions {
    clauses: Vec<String>,
    args: Vec<Value>,
}

impl Conditions {
    fn push(&mut self, clause: impl Into<String>, value: impl Into<Value>) {
        self.clauses.push(clause.into());
        self.args.push(value.into());
    }

    fn push_bare(&mut self, clause: impl Into<String>) {
        self.clauses.push(clause.into());
    }

    fn push_scope(&mut self, scope: Scope, alias: &str) {
        if let Some((clause, id)) = scope.sql_predicate(alias) {
            self.push(clause, id);
        }
    }

    fn push_like(&mut self, column: &str, q: Option<&str>) {
        if let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) {
            self.push(format!("{column} LIKE ?"), format!("%{q}%"));
        }
    }

    fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// Arguments followed by LIMIT/OFFSET for the page.
    fn paged_args(&self, page: PageRequest) -> Vec<Value> {
        let mut args = self.args.clone();
        args.push(Value::Integer(page.size));
        args.push(Value::Integer(page.offset()));
        args
    }
}

const ASSET_SELECT: &str = "SELECT a.asset_id, a.asset_id_hash, a.asset_name, a.asset_brand,
        a.asset_specification, a.asset_classification, a.asset_condition, a.asset_pic,
        a.personal_responsible, a.asset_purchase_date, a.asset_maintenance_date, a.asset_status,
        a.classification_acquisition_value, a.classification_last_book_value, a.deprecation_value,
        a.asset_image, a.outlet_id, a.area_id, a.created_at,
        ar.area_name, o.outlet_name, r.role_name, c.classification_name, mp.period_name
     FROM assets a
     LEFT JOIN areas ar ON ar.area_id = a.area_id
     LEFT JOIN outlets o ON o.outlet_id = a.outlet_id
     LEFT JOIN roles r ON r.role_id = a.asset_pic
     LEFT JOIN classifications c ON c.classification_id = a.asset_classification
     LEFT JOIN maintenance_periods mp ON mp.period_id = c.maintenance_period_id";

fn asset_from_row(row: &Row<'_>) -> rusqlite::Result<Asset> {
    Ok(Asset {
        asset_id: row.get(0)?,
        asset_id_hash: row.get(1)?,
        asset_name: row.get(2)?,
        asset_brand: row.get(3)?,
        asset_specification: row.get(4)?,
        asset_classification: row.get(5)?,
        asset_condition: row.get(6)?,
        asset_pic: row.get(7)?,
        personal_responsible: row.get(8)?,
        asset_purchase_date: date_column(row, 9)?,
        asset_maintenance_date: date_column(row, 10)?,
        asset_status: row.get(11)?,
        classification_acquisition_value: row.get(12)?,
        classification_last_book_value: row.get(13)?,
        deprecation_value: row.get(14)?,
        asset_image: row.get(15)?,
        outlet_id: row.get(16)?,
        area_id: row.get(17)?,
        created_at: datetime_column(row, 18)?,
    })
}

fn asset_detail_from_row(row: &Row<'_>) -> rusqlite::Result<AssetDetail> {
    Ok(AssetDetail {
        asset: asset_from_row(row)?,
        area_name: row.get(19)?,
        outlet_name: row.get(20)?,
        asset_pic_name: row.get(21)?,
        asset_classification_name: row.get(22)?,
        maintenance_period_name: row.get(23)?,
    })
}

const SUBMISSION_COLUMNS: &str = "s.submission_id, s.submission_name, s.submission_outlet,
        s.submission_area, s.submission_date, s.submission_category, s.submission_status,
        s.submission_purpose, s.submission_quantity, s.submission_asset_name,
        s.submission_description, s.nip, s.asset_id, s.attachment, s.submission_pr_name,
        s.submission_role_name, s.outlet_id, s.area_id, s.submission_price,
        s.submission_parent_id, s.created_at";

fn submission_from_row(row: &Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        submission_id: row.get(0)?,
        submission_name: row.get(1)?,
        submission_outlet: row.get(2)?,
        submission_area: row.get(3)?,
        submission_date: date_column(row, 4)?,
        submission_category: row.get(5)?,
        submission_status: row.get(6)?,
        submission_purpose: row.get(7)?,
        submission_quantity: row.get(8)?,
        submission_asset_name: row.get(9)?,
        submission_description: row.get(10)?,
        nip: row.get(11)?,
        asset_id: row.get(12)?,
        attachment: row.get(13)?,
        submission_pr_name: row.get(14)?,
        submission_role_name: row.get(15)?,
        outlet_id: row.get(16)?,
        area_id: row.get(17)?,
        submission_price: row.get(18)?,
        submission_parent_id: row.get(19)?,
        created_at: datetime_column(row, 20)?,
    })
}

const NOTIFICATION_COLUMNS: &str = "n.id_notification, n.asset_id, n.submission_id, n.status,
        n.asset_name, n.outlet_id, n.area_id, n.maintenance_or_submitted";

fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    let raw_status: String = row.get(3)?;
    let status = NotificationStatus::parse(&raw_status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            format!("unknown notification status '{raw_status}'").into(),
        )
    })?;
    Ok(Notification {
        id_notification: row.get(0)?,
        asset_id: row.get(1)?,
        submission_id: row.get(2)?,
        status,
        asset_name: row.get(4)?,
        outlet_id: row.get(5)?,
        area_id: row.get(6)?,
        maintenance_or_submitted: date_column(row, 7)?,
    })
}

const USER_DETAIL_SELECT: &str = "SELECT u.nip, u.user_full_name, u.user_email, u.role_id, r.role_name,
        u.area_id, u.outlet_id
     FROM users u LEFT JOIN roles r ON r.role_id = u.role_id";

fn user_detail_from_row(row: &Row<'_>) -> rusqlite::Result<UserDetail> {
    Ok(UserDetail {
        nip: row.get(0)?,
        user_full_name: row.get(1)?,
        user_email: row.get(2)?,
        role_id: row.get(3)?,
        role_name: row.get(4)?,
        area_id: row.get(5)?,
        outlet_id: row.get(6)?,
    })
}

/// A zero location id from a client means "none".
fn non_zero(id: Option<i64>) -> Option<i64> {
    id.filter(|id| *id != 0)
}

fn insert_asset_update(
    conn: &Connection,
    asset_id: i64,
    status: &str,
    now: &DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO asset_updates (asset_id, asset_status, created_at) VALUES (?1, ?2, ?3)",
        params![asset_id, status, format_datetime(now)],
    )?;
    Ok(())
}

fn set_asset_status(conn: &Connection, asset_id: i64, status: &str) -> Result<()> {
    let rows = conn.execute(
        "UPDATE assets SET asset_status = ?1 WHERE asset_id = ?2",
        params![status, asset_id],
    )?;
    if rows == 0 {
        return Err(Error::not_found("Asset not found"));
    }
    Ok(())
}

fn insert_submission_log(
    conn: &Connection,
    submission_id: i64,
    status: &str,
    description: &str,
    pr_name: &str,
    now: &DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO submission_logs (submission_id, status, description, pr_name, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            submission_id,
            status,
            description,
            pr_name,
            format_datetime(now)
        ],
    )?;
    Ok(())
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA)?;
        for role in KnownRole::ALL {
            conn.execute(
                "INSERT OR IGNORE INTO roles (role_id, role_name) VALUES (?1, ?2)",
                params![role.id(), role.display_name()],
            )?;
        }
        Ok(())
    }

    // Area and outlet operations

    fn create_area(&self, name: &str) -> Result<Area> {
        let conn = self.conn();
        conn.execute("INSERT INTO areas (area_name) VALUES (?1)", params![name])?;
        Ok(Area {
            area_id: conn.last_insert_rowid(),
            area_name: name.to_string(),
        })
    }

    fn list_areas(&self) -> Result<Vec<Area>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT area_id, area_name FROM areas ORDER BY area_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Area {
                area_id: row.get(0)?,
                area_name: row.get(1)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_area(&self, id: i64) -> Result<Option<Area>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT area_id, area_name FROM areas WHERE area_id = ?1",
            params![id],
            |row| {
                Ok(Area {
                    area_id: row.get(0)?,
                    area_name: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn create_outlet(&self, name: &str, area_id: Option<i64>) -> Result<Outlet> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("INSERT INTO outlets (outlet_name) VALUES (?1)", params![name])?;
        let outlet_id = tx.last_insert_rowid();

        let area_id = non_zero(area_id);
        if let Some(area_id) = area_id {
            tx.execute(
                "INSERT INTO area_outlets (area_id, outlet_id) VALUES (?1, ?2)",
                params![area_id, outlet_id],
            )?;
        }
        tx.commit()?;

        Ok(Outlet {
            outlet_id,
            outlet_name: name.to_string(),
            area_id,
        })
    }

    fn list_outlets(&self, area_id: Option<i64>) -> Result<Vec<Outlet>> {
        let conn = self.conn();
        let mut conditions = Conditions::default();
        if let Some(area_id) = non_zero(area_id) {
            conditions.push("ao.area_id = ?", area_id);
        }

        let sql = format!(
            "SELECT o.outlet_id, o.outlet_name, ao.area_id
             FROM outlets o LEFT JOIN area_outlets ao ON ao.outlet_id = o.outlet_id{}
             ORDER BY o.outlet_id",
            conditions.where_sql()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(conditions.args.iter()), |row| {
            Ok(Outlet {
                outlet_id: row.get(0)?,
                outlet_name: row.get(1)?,
                area_id: row.get(2)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Role, position and personal responsible operations

    fn list_roles(&self) -> Result<Vec<Role>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT role_id, role_name FROM roles ORDER BY role_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Role {
                role_id: row.get(0)?,
                role_name: row.get(1)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_role(&self, id: i64) -> Result<Option<Role>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT role_id, role_name FROM roles WHERE role_id = ?1",
            params![id],
            |row| {
                Ok(Role {
                    role_id: row.get(0)?,
                    role_name: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn create_position(&self, name: &str) -> Result<Position> {
        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO positions (position_name) VALUES (?1)",
            params![name],
        );
        match result {
            Ok(_) => Ok(Position {
                position_id: conn.last_insert_rowid(),
                position_name: name.to_string(),
            }),
            Err(e) => {
                let err = Error::from(e);
                if err.is_unique_violation() {
                    Err(Error::AlreadyExists(format!("Position '{name}' already exists")))
                } else {
                    Err(err)
                }
            }
        }
    }

    fn list_positions(&self) -> Result<Vec<Position>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT position_id, position_name FROM positions ORDER BY position_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Position {
                position_id: row.get(0)?,
                position_name: row.get(1)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn create_personal_responsible(&self, name: &str) -> Result<PersonalResponsible> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO personal_responsibles (personal_name) VALUES (?1)",
            params![name],
        )?;
        Ok(PersonalResponsible {
            personal_responsible_id: conn.last_insert_rowid(),
            personal_name: name.to_string(),
        })
    }

    fn list_personal_responsibles(&self) -> Result<Vec<PersonalResponsible>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT personal_responsible_id, personal_name FROM personal_responsibles
             ORDER BY personal_responsible_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PersonalResponsible {
                personal_responsible_id: row.get(0)?,
                personal_name: row.get(1)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Maintenance period and classification operations

    fn create_maintenance_period(&self, name: &str, months: u32) -> Result<MaintenancePeriod> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO maintenance_periods (period_name, period_months) VALUES (?1, ?2)",
            params![name, months],
        )?;
        Ok(MaintenancePeriod {
            period_id: conn.last_insert_rowid(),
            period_name: name.to_string(),
            period_months: months,
        })
    }

    fn list_maintenance_periods(&self) -> Result<Vec<MaintenancePeriod>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT period_id, period_name, period_months FROM maintenance_periods ORDER BY period_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(MaintenancePeriod {
                period_id: row.get(0)?,
                period_name: row.get(1)?,
                period_months: row.get(2)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_maintenance_period(&self, id: i64) -> Result<Option<MaintenancePeriod>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT period_id, period_name, period_months FROM maintenance_periods
             WHERE period_id = ?1",
            params![id],
            |row| {
                Ok(MaintenancePeriod {
                    period_id: row.get(0)?,
                    period_name: row.get(1)?,
                    period_months: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn create_classification(&self, classification: &NewClassification) -> Result<Classification> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO classifications (classification_name, classification_economic_value,
                maintenance_period_id, asset_healthy_param)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                classification.classification_name,
                classification.classification_economic_value,
                classification.maintenance_period_id,
                classification.asset_healthy_param,
            ],
        )?;
        Ok(Classification {
            classification_id: conn.last_insert_rowid(),
            classification_name: classification.classification_name.clone(),
            classification_economic_value: classification.classification_economic_value,
            maintenance_period_id: classification.maintenance_period_id,
            asset_healthy_param: classification.asset_healthy_param.clone(),
        })
    }

    fn list_classifications(&self) -> Result<Vec<Classification>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT classification_id, classification_name, classification_economic_value,
                maintenance_period_id, asset_healthy_param
             FROM classifications ORDER BY classification_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Classification {
                classification_id: row.get(0)?,
                classification_name: row.get(1)?,
                classification_economic_value: row.get(2)?,
                maintenance_period_id: row.get(3)?,
                asset_healthy_param: row.get(4)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_classification(&self, id: i64) -> Result<Option<ClassificationDetail>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT c.classification_id, c.classification_name, c.classification_economic_value,
                c.maintenance_period_id, c.asset_healthy_param, mp.period_name, mp.period_months
             FROM classifications c
             LEFT JOIN maintenance_periods mp ON mp.period_id = c.maintenance_period_id
             WHERE c.classification_id = ?1",
            params![id],
            |row| {
                Ok(ClassificationDetail {
                    classification: Classification {
                        classification_id: row.get(0)?,
                        classification_name: row.get(1)?,
                        classification_economic_value: row.get(2)?,
                        maintenance_period_id: row.get(3)?,
                        asset_healthy_param: row.get(4)?,
                    },
                    maintenance_period_name: row.get(5)?,
                    period_months: row.get::<_, Option<u32>>(6)?.unwrap_or(0),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    // Asset operations

    fn create_asset(&self, asset: &NewAsset, hasher: AssetHasher<'_>) -> Result<Asset> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO assets (asset_name, asset_brand, asset_specification, asset_classification,
                asset_condition, asset_pic, personal_responsible, asset_purchase_date,
                asset_maintenance_date, asset_status, classification_acquisition_value,
                classification_last_book_value, deprecation_value, asset_image, outlet_id, area_id,
                created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                asset.asset_name,
                asset.asset_brand,
                asset.asset_specification,
                asset.asset_classification,
                asset.asset_condition,
                non_zero(asset.asset_pic),
                asset.personal_responsible,
                format_date(&asset.asset_purchase_date),
                format_date(&asset.asset_maintenance_date),
                asset.asset_status,
                asset.classification_acquisition_value,
                asset.classification_last_book_value,
                asset.deprecation_value,
                asset.asset_image,
                non_zero(asset.outlet_id),
                non_zero(asset.area_id),
                format_datetime(&asset.created_at),
            ],
        )?;
        let asset_id = tx.last_insert_rowid();

        let hash = hasher(asset_id)?;
        tx.execute(
            "UPDATE assets SET asset_id_hash = ?1 WHERE asset_id = ?2",
            params![hash, asset_id],
        )?;
        tx.commit()?;

        Ok(Asset {
            asset_id,
            asset_id_hash: Some(hash),
            asset_name: asset.asset_name.clone(),
            asset_brand: asset.asset_brand.clone(),
            asset_specification: asset.asset_specification.clone(),
            asset_classification: asset.asset_classification,
            asset_condition: asset.asset_condition.clone(),
            asset_pic: non_zero(asset.asset_pic),
            personal_responsible: asset.personal_responsible.clone(),
            asset_purchase_date: asset.asset_purchase_date,
            asset_maintenance_date: asset.asset_maintenance_date,
            asset_status: asset.asset_status.clone(),
            classification_acquisition_value: asset.classification_acquisition_value,
            classification_last_book_value: asset.classification_last_book_value,
            deprecation_value: asset.deprecation_value,
            asset_image: asset.asset_image.clone(),
            outlet_id: non_zero(asset.outlet_id),
            area_id: non_zero(asset.area_id),
            created_at: asset.created_at,
        })
    }

    fn get_asset(&self, id: i64) -> Result<Option<AssetDetail>> {
        let conn = self.conn();
        conn.query_row(
            &format!("{ASSET_SELECT} WHERE a.asset_id = ?1"),
            params![id],
            asset_detail_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_asset_by_hash(&self, hash: &str) -> Result<Option<AssetDetail>> {
        let conn = self.conn();
        conn.query_row(
            &format!("{ASSET_SELECT} WHERE a.asset_id_hash = ?1"),
            params![hash],
            asset_detail_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_assets(&self, filter: &AssetFilter, page: PageRequest) -> Result<Page<AssetDetail>> {
        let conn = self.conn();
        let mut conditions = Conditions::default();
        conditions.push_like("a.asset_name", filter.q.as_deref());
        conditions.push_scope(filter.scope, "a");
        match filter.partition {
            AssetPartition::Perkap => {
                conditions.push("a.asset_classification = ?", PERKAP_CLASSIFICATION_ID)
            }
            AssetPartition::General => {
                conditions.push("a.asset_classification <> ?", PERKAP_CLASSIFICATION_ID)
            }
        }
        let where_sql = conditions.where_sql();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM assets a{where_sql}"),
            params_from_iter(conditions.args.iter()),
            |row| row.get(0),
        )?;

        let mut stmt =
            conn.prepare(&format!("{ASSET_SELECT}{where_sql} ORDER BY a.asset_id LIMIT ? OFFSET ?"))?;
        let rows = stmt.query_map(
            params_from_iter(conditions.paged_args(page).iter()),
            asset_detail_from_row,
        )?;
        let items = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page { items, total })
    }

    fn list_all_assets(&self) -> Result<Vec<Asset>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{ASSET_SELECT} ORDER BY a.asset_id"))?;
        let rows = stmt.query_map([], asset_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_asset(&self, asset: &Asset, now: DateTime<Utc>) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let rows = tx.execute(
            "UPDATE assets SET asset_name = ?1, asset_brand = ?2, asset_specification = ?3,
                asset_classification = ?4, asset_condition = ?5, asset_pic = ?6,
                personal_responsible = ?7, asset_purchase_date = ?8, asset_maintenance_date = ?9,
                asset_status = ?10, classification_acquisition_value = ?11,
                classification_last_book_value = ?12, deprecation_value = ?13, asset_image = ?14,
                outlet_id = ?15, area_id = ?16
             WHERE asset_id = ?17",
            params![
                asset.asset_name,
                asset.asset_brand,
                asset.asset_specification,
                asset.asset_classification,
                asset.asset_condition,
                non_zero(asset.asset_pic),
                asset.personal_responsible,
                format_date(&asset.asset_purchase_date),
                format_date(&asset.asset_maintenance_date),
                asset.asset_status,
                asset.classification_acquisition_value,
                asset.classification_last_book_value,
                asset.deprecation_value,
                asset.asset_image,
                non_zero(asset.outlet_id),
                non_zero(asset.area_id),
                asset.asset_id,
            ],
        )?;
        if rows == 0 {
            return Err(Error::not_found("Asset not found"));
        }

        insert_asset_update(&tx, asset.asset_id, &asset.asset_status, &now)?;
        tx.commit()?;
        Ok(())
    }

    fn update_asset_status(
        &self,
        id: i64,
        status: &str,
        maintenance_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let rows = tx.execute(
            "UPDATE assets SET asset_status = ?1,
                asset_maintenance_date = COALESCE(?2, asset_maintenance_date)
             WHERE asset_id = ?3",
            params![status, maintenance_date.as_ref().map(format_date), id],
        )?;
        if rows == 0 {
            return Err(Error::not_found("Asset not found"));
        }

        insert_asset_update(&tx, id, status, &now)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_asset(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM assets WHERE asset_id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn list_asset_updates(&self, asset_id: i64) -> Result<Vec<AssetUpdate>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, asset_id, asset_status, created_at FROM asset_updates
             WHERE asset_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![asset_id], |row| {
            Ok(AssetUpdate {
                id: row.get(0)?,
                asset_id: row.get(1)?,
                asset_status: row.get(2)?,
                created_at: datetime_column(row, 3)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Submission operations

    fn create_submission(&self, submission: &NewSubmission) -> Result<Submission> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO submissions (submission_name, submission_outlet, submission_area,
                submission_date, submission_category, submission_status, submission_purpose,
                submission_quantity, submission_asset_name, submission_description, nip, asset_id,
                attachment, submission_pr_name, submission_role_name, outlet_id, area_id,
                submission_price, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                ?18, ?19)",
            params![
                submission.submission_name,
                submission.submission_outlet,
                submission.submission_area,
                format_date(&submission.submission_date),
                submission.submission_category,
                submission.submission_status,
                submission.submission_purpose,
                submission.submission_quantity,
                submission.submission_asset_name,
                submission.submission_description,
                submission.nip,
                submission.asset_id,
                submission.attachment,
                submission.submission_pr_name,
                submission.submission_role_name,
                non_zero(submission.outlet_id),
                non_zero(submission.area_id),
                submission.submission_price,
                format_datetime(&submission.created_at),
            ],
        )?;
        let submission_id = tx.last_insert_rowid();

        insert_submission_log(
            &tx,
            submission_id,
            SUBMITTED_LOG_STATUS,
            &submission.submission_description,
            &submission.submission_pr_name,
            &submission.created_at,
        )?;
        set_asset_status(&tx, submission.asset_id, &submission.submission_category)?;
        insert_asset_update(
            &tx,
            submission.asset_id,
            &submission.submission_category,
            &submission.created_at,
        )?;

        let created = tx.query_row(
            &format!("SELECT {SUBMISSION_COLUMNS} FROM submissions s WHERE s.submission_id = ?1"),
            params![submission_id],
            submission_from_row,
        )?;
        tx.commit()?;
        Ok(created)
    }

    fn get_submission(&self, id: i64) -> Result<Option<Submission>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {SUBMISSION_COLUMNS} FROM submissions s WHERE s.submission_id = ?1"),
            params![id],
            submission_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_submissions(
        &self,
        filter: &SubmissionFilter,
        page: PageRequest,
    ) -> Result<Page<Submission>> {
        let conn = self.conn();
        let mut conditions = Conditions::default();
        conditions.push_like("s.submission_name", filter.q.as_deref());
        if let Some(scope) = filter.scope {
            conditions.push_scope(scope, "s");
        }
        if let Some(area_id) = non_zero(filter.area_id) {
            conditions.push("s.area_id = ?", area_id);
        }
        if let Some(outlet_id) = non_zero(filter.outlet_id) {
            conditions.push("s.outlet_id = ?", outlet_id);
        }
        match non_zero(filter.submission_parent_id) {
            Some(parent_id) => conditions.push("s.submission_parent_id = ?", parent_id),
            None if filter.grouped => conditions.push_bare("s.submission_parent_id IS NOT NULL"),
            None => conditions.push_bare("s.submission_parent_id IS NULL"),
        }
        let where_sql = conditions.where_sql();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM submissions s{where_sql}"),
            params_from_iter(conditions.args.iter()),
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions s{where_sql}
             ORDER BY s.created_at DESC, s.submission_id DESC LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt.query_map(
            params_from_iter(conditions.paged_args(page).iter()),
            submission_from_row,
        )?;
        let items = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page { items, total })
    }

    fn list_all_submissions(&self) -> Result<Vec<Submission>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions s ORDER BY s.submission_id"
        ))?;
        let rows = stmt.query_map([], submission_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn count_submissions_by_category(
        &self,
        scope: Scope,
        categories: &[&str],
    ) -> Result<Vec<(String, i64)>> {
        let conn = self.conn();
        let mut counts = Vec::with_capacity(categories.len());
        for category in categories {
            let mut conditions = Conditions::default();
            conditions.push("s.submission_category = ?", category.to_string());
            conditions.push_scope(scope, "s");

            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM submissions s{}", conditions.where_sql()),
                params_from_iter(conditions.args.iter()),
                |row| row.get(0),
            )?;
            counts.push((category.to_string(), count));
        }
        Ok(counts)
    }

    fn update_submission_status(
        &self,
        id: i64,
        status: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Submission> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let rows = tx.execute(
            "UPDATE submissions SET submission_status = ?1 WHERE submission_id = ?2",
            params![status, id],
        )?;
        if rows == 0 {
            return Err(Error::not_found("Submission not found"));
        }

        let submission = tx.query_row(
            &format!("SELECT {SUBMISSION_COLUMNS} FROM submissions s WHERE s.submission_id = ?1"),
            params![id],
            submission_from_row,
        )?;

        insert_submission_log(
            &tx,
            id,
            status,
            &format!("Status updated to {status}"),
            actor,
            &now,
        )?;
        set_asset_status(&tx, submission.asset_id, status)?;
        insert_asset_update(&tx, submission.asset_id, status, &now)?;
        tx.commit()?;

        Ok(submission)
    }

    fn list_submission_logs(&self, submission_id: i64) -> Result<Vec<SubmissionLog>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, submission_id, status, description, pr_name, created_at
             FROM submission_logs WHERE submission_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![submission_id], |row| {
            Ok(SubmissionLog {
                id: row.get(0)?,
                submission_id: row.get(1)?,
                status: row.get(2)?,
                description: row.get(3)?,
                pr_name: row.get(4)?,
                created_at: datetime_column(row, 5)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn create_submission_parent(
        &self,
        parent: &NewSubmissionParent,
        submission_ids: &[i64],
    ) -> Result<i64> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO submission_parents (nip, outlet_id, area_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                parent.nip,
                non_zero(parent.outlet_id),
                non_zero(parent.area_id),
                format_datetime(&parent.created_at),
            ],
        )?;
        let parent_id = tx.last_insert_rowid();

        for submission_id in submission_ids {
            let rows = tx.execute(
                "UPDATE submissions SET submission_parent_id = ?1 WHERE submission_id = ?2",
                params![parent_id, submission_id],
            )?;
            if rows == 0 {
                return Err(Error::not_found(format!(
                    "Submission {submission_id} not found"
                )));
            }
        }
        tx.commit()?;
        Ok(parent_id)
    }

    fn list_submission_parents(
        &self,
        filter: &SubmissionParentFilter,
        page: PageRequest,
    ) -> Result<Page<SubmissionParent>> {
        let conn = self.conn();
        let mut conditions = Conditions::default();
        conditions.push_like("sp.nip", filter.q.as_deref());
        if let Some(nip) = filter.nip.as_deref().filter(|n| !n.is_empty()) {
            conditions.push("sp.nip = ?", nip.to_string());
        }
        if let Some(scope) = filter.scope {
            conditions.push_scope(scope, "sp");
        }
        let where_sql = conditions.where_sql();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM submission_parents sp{where_sql}"),
            params_from_iter(conditions.args.iter()),
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT sp.submission_parent_id, sp.nip, sp.outlet_id, sp.area_id, o.outlet_name,
                ar.area_name, sp.created_at
             FROM submission_parents sp
             LEFT JOIN outlets o ON o.outlet_id = sp.outlet_id
             LEFT JOIN areas ar ON ar.area_id = sp.area_id{where_sql}
             ORDER BY sp.submission_parent_id LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt.query_map(params_from_iter(conditions.paged_args(page).iter()), |row| {
            Ok(SubmissionParent {
                submission_parent_id: row.get(0)?,
                nip: row.get(1)?,
                outlet_id: row.get(2)?,
                area_id: row.get(3)?,
                outlet_name: row.get(4)?,
                area_name: row.get(5)?,
                created_at: datetime_column(row, 6)?,
            })
        })?;
        let items = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page { items, total })
    }

    // Notification operations

    fn get_notification(&self, id: i64) -> Result<Option<Notification>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications n WHERE n.id_notification = ?1"
            ),
            params![id],
            notification_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn find_maintenance_notification(&self, asset_id: i64) -> Result<Option<Notification>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications n
                 WHERE n.asset_id = ?1 AND n.status <> 'submitted'
                 ORDER BY n.id_notification LIMIT 1"
            ),
            params![asset_id],
            notification_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn has_submitted_notification(&self, asset_id: i64) -> Result<bool> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE asset_id = ?1 AND status = 'submitted'",
            params![asset_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn insert_notification(&self, notification: &NewNotification) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO notifications (asset_id, submission_id, status, asset_name, outlet_id,
                area_id, maintenance_or_submitted)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                notification.asset_id,
                notification.submission_id,
                notification.status.as_str(),
                notification.asset_name,
                notification.outlet_id,
                notification.area_id,
                format_date(&notification.maintenance_or_submitted),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update_notification(
        &self,
        id: i64,
        status: NotificationStatus,
        date: NaiveDate,
    ) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE notifications SET status = ?1, maintenance_or_submitted = ?2
             WHERE id_notification = ?3",
            params![status.as_str(), format_date(&date), id],
        )?;

        if rows == 0 {
            return Err(Error::not_found("Notification not found"));
        }
        Ok(())
    }

    fn delete_notification(&self, id: i64) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM notifications WHERE id_notification = ?1",
            params![id],
        )?;
        Ok(rows > 0)
    }

    fn list_notifications(
        &self,
        scope: Scope,
        q: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<Notification>> {
        let conn = self.conn();
        let mut conditions = Conditions::default();
        conditions.push_scope(scope, "n");
        conditions.push_like("n.asset_name", q);

        let mut stmt = conn.prepare(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications n{}
             ORDER BY n.maintenance_or_submitted, n.id_notification LIMIT ? OFFSET ?",
            conditions.where_sql()
        ))?;
        let rows = stmt.query_map(
            params_from_iter(conditions.paged_args(page).iter()),
            notification_from_row,
        )?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn count_notifications(&self, scope: Scope, q: Option<&str>) -> Result<NotificationCounts> {
        let conn = self.conn();
        let mut conditions = Conditions::default();
        conditions.push_scope(scope, "n");
        conditions.push_like("n.asset_name", q);

        let mut stmt = conn.prepare(&format!(
            "SELECT n.status, COUNT(*) FROM notifications n{} GROUP BY n.status",
            conditions.where_sql()
        ))?;
        let rows = stmt.query_map(params_from_iter(conditions.args.iter()), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = NotificationCounts::default();
        for row in rows {
            let (status, count) = row?;
            match NotificationStatus::parse(&status) {
                Some(NotificationStatus::Waiting) => counts.total_waiting = count,
                Some(NotificationStatus::Late) => counts.total_late = count,
                Some(NotificationStatus::Submitted) => counts.total_submitted = count,
                None => tracing::warn!("Ignoring notifications with unknown status '{status}'"),
            }
        }
        Ok(counts)
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO users (nip, user_full_name, user_email, user_password, role_id, area_id,
                outlet_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.nip,
                user.user_full_name,
                user.user_email,
                user.user_password,
                user.role_id,
                non_zero(user.area_id),
                non_zero(user.outlet_id),
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let err = Error::from(e);
                if err.is_unique_violation() {
                    Err(Error::AlreadyExists(format!(
                        "User with nip '{}' already exists",
                        user.nip
                    )))
                } else {
                    Err(err)
                }
            }
        }
    }

    fn get_user(&self, nip: &str) -> Result<Option<UserDetail>> {
        let conn = self.conn();
        conn.query_row(
            &format!("{USER_DETAIL_SELECT} WHERE u.nip = ?1"),
            params![nip],
            user_detail_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_credentials(&self, nip: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT nip, user_full_name, user_email, user_password, role_id, area_id, outlet_id
             FROM users WHERE nip = ?1",
            params![nip],
            |row| {
                Ok(User {
                    nip: row.get(0)?,
                    user_full_name: row.get(1)?,
                    user_email: row.get(2)?,
                    user_password: row.get(3)?,
                    role_id: row.get(4)?,
                    area_id: row.get(5)?,
                    outlet_id: row.get(6)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self, q: Option<&str>, page: PageRequest) -> Result<Page<UserDetail>> {
        let conn = self.conn();
        let mut conditions = Conditions::default();
        if let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{q}%");
            conditions.clauses.push("(u.user_full_name LIKE ? OR u.user_email LIKE ?)".into());
            conditions.args.push(Value::Text(pattern.clone()));
            conditions.args.push(Value::Text(pattern));
        }
        let where_sql = conditions.where_sql();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM users u{where_sql}"),
            params_from_iter(conditions.args.iter()),
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "{USER_DETAIL_SELECT}{where_sql} ORDER BY u.nip LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt.query_map(
            params_from_iter(conditions.paged_args(page).iter()),
            user_detail_from_row,
        )?;
        let items = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page { items, total })
    }

    fn list_all_users(&self) -> Result<Vec<UserDetail>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{USER_DETAIL_SELECT} ORDER BY u.nip"))?;
        let rows = stmt.query_map([], user_detail_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE users SET user_full_name = ?1, user_email = ?2, user_password = ?3,
                role_id = ?4, area_id = ?5, outlet_id = ?6
             WHERE nip = ?7",
            params![
                user.user_full_name,
                user.user_email,
                user.user_password,
                user.role_id,
                non_zero(user.area_id),
                non_zero(user.outlet_id),
                user.nip,
            ],
        )?;

        if rows == 0 {
            return Err(Error::not_found("User not found"));
        }
        Ok(())
    }

    fn update_user_password(&self, nip: &str, password_hash: &str) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE users SET user_password = ?1 WHERE nip = ?2",
            params![password_hash, nip],
        )?;

        if rows == 0 {
            return Err(Error::not_found("User not found"));
        }
        Ok(())
    }

    fn delete_user(&self, nip: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE nip = ?1", params![nip])?;
        Ok(rows > 0)
    }

    fn count_users(&self) -> Result<i64> {
        let conn = self.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    // Token store operations

    fn insert_token(&self, token: &StoredToken) -> Result<()> {
        self.conn().execute(
            "INSERT INTO token_stores (token, created_at, exp_token) VALUES (?1, ?2, ?3)",
            params![
                token.token,
                format_datetime(&token.created_at),
                format_datetime(&token.exp_token),
            ],
        )?;
        Ok(())
    }

    fn get_token(&self, token: &str) -> Result<Option<StoredToken>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT token, created_at, exp_token FROM token_stores WHERE token = ?1",
            params![token],
            |row| {
                Ok(StoredToken {
                    token: row.get(0)?,
                    created_at: datetime_column(row, 1)?,
                    exp_token: datetime_column(row, 2)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_token(&self, token: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM token_stores WHERE token = ?1", params![token])?;
        Ok(rows > 0)
    }

    fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<usize> {
        let rows = self.conn().execute(
            "DELETE FROM token_stores WHERE exp_token < ?1",
            params![format_datetime(&now)],
        )?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, SqliteStore) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (temp, store)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hash_plain(id: i64) -> Result<String> {
        Ok(format!("hash-{id}"))
    }

    fn new_asset(name: &str, classification: i64) -> NewAsset {
        NewAsset {
            asset_name: name.to_string(),
            asset_brand: "Lenovo".to_string(),
            asset_specification: "i5 / 16GB".to_string(),
            asset_classification: classification,
            asset_condition: "Baru".to_string(),
            asset_pic: None,
            personal_responsible: "Budi".to_string(),
            asset_purchase_date: date(2024, 1, 15),
            asset_maintenance_date: date(2024, 7, 20),
            asset_status: GOOD_STATUS.to_string(),
            classification_acquisition_value: 12_000,
            classification_last_book_value: 12_000,
            deprecation_value: 1_000,
            asset_image: None,
            outlet_id: None,
            area_id: None,
            created_at: Utc::now(),
        }
    }

    fn seed_classification(store: &SqliteStore) -> Classification {
        let period = store.create_maintenance_period("6 Bulan", 6).unwrap();
        store
            .create_classification(&NewClassification {
                classification_name: "Elektronik".to_string(),
                classification_economic_value: 12,
                maintenance_period_id: Some(period.period_id),
                asset_healthy_param: Some("Menyala,Tidak retak".to_string()),
            })
            .unwrap()
    }

    fn new_submission(asset: &Asset) -> NewSubmission {
        NewSubmission {
            submission_name: "Service laptop".to_string(),
            submission_outlet: String::new(),
            submission_area: String::new(),
            submission_date: date(2024, 6, 1),
            submission_category: "Pengajuan Service".to_string(),
            submission_status: "Pending".to_string(),
            submission_purpose: "Layar rusak".to_string(),
            submission_quantity: 1,
            submission_asset_name: asset.asset_name.clone(),
            submission_description: "Layar berkedip".to_string(),
            nip: "1001".to_string(),
            asset_id: asset.asset_id,
            attachment: None,
            submission_pr_name: "Budi".to_string(),
            submission_role_name: "Outlet Staff".to_string(),
            outlet_id: None,
            area_id: None,
            submission_price: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_initialize_creates_tables_and_roles() {
        let (_temp, store) = open_store();

        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        drop(conn);

        for table in [
            "areas",
            "outlets",
            "area_outlets",
            "roles",
            "positions",
            "personal_responsibles",
            "maintenance_periods",
            "classifications",
            "assets",
            "asset_updates",
            "submissions",
            "submission_logs",
            "submission_parents",
            "notifications",
            "users",
            "token_stores",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }

        let roles = store.list_roles().unwrap();
        assert_eq!(roles.len(), KnownRole::ALL.len());
        assert_eq!(roles[4].role_name, "Area Manager");
    }

    #[test]
    fn test_initialize_is_repeatable() {
        let (_temp, store) = open_store();
        store.initialize().unwrap();
        assert_eq!(store.list_roles().unwrap().len(), KnownRole::ALL.len());
    }

    #[test]
    fn test_outlet_linked_to_area() {
        let (_temp, store) = open_store();
        let north = store.create_area("Utara").unwrap();
        let south = store.create_area("Selatan").unwrap();

        store.create_outlet("Outlet A", Some(north.area_id)).unwrap();
        store.create_outlet("Outlet B", Some(south.area_id)).unwrap();
        store.create_outlet("Outlet C", None).unwrap();

        assert_eq!(store.list_outlets(None).unwrap().len(), 3);

        let in_north = store.list_outlets(Some(north.area_id)).unwrap();
        assert_eq!(in_north.len(), 1);
        assert_eq!(in_north[0].outlet_name, "Outlet A");
        assert_eq!(in_north[0].area_id, Some(north.area_id));
    }

    #[test]
    fn test_outlet_with_unknown_area_rolls_back() {
        let (_temp, store) = open_store();
        let result = store.create_outlet("Orphan", Some(999));
        assert!(matches!(result, Err(Error::Database(_))));
        assert!(store.list_outlets(None).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_position() {
        let (_temp, store) = open_store();
        store.create_position("Manager").unwrap();
        let result = store.create_position("Manager");
        assert!(matches!(result, Err(Error::AlreadyExists(_))));
        assert_eq!(store.list_positions().unwrap().len(), 1);
    }

    #[test]
    fn test_classification_detail_joins_period() {
        let (_temp, store) = open_store();
        let classification = seed_classification(&store);

        let detail = store
            .get_classification(classification.classification_id)
            .unwrap()
            .unwrap();
        assert_eq!(detail.period_months, 6);
        assert_eq!(detail.maintenance_period_name.as_deref(), Some("6 Bulan"));
        assert_eq!(detail.healthy_params()["param_2"], "Tidak retak");

        assert!(store.get_classification(999).unwrap().is_none());
    }

    #[test]
    fn test_create_asset_backfills_hash() {
        let (_temp, store) = open_store();
        let classification = seed_classification(&store);

        let asset = store
            .create_asset(&new_asset("Laptop", classification.classification_id), &hash_plain)
            .unwrap();
        assert_eq!(asset.asset_id_hash.as_deref(), Some(format!("hash-{}", asset.asset_id).as_str()));

        let by_hash = store
            .get_asset_by_hash(&format!("hash-{}", asset.asset_id))
            .unwrap()
            .unwrap();
        assert_eq!(by_hash.asset.asset_id, asset.asset_id);
        assert_eq!(by_hash.asset_classification_name.as_deref(), Some("Elektronik"));
        assert_eq!(by_hash.maintenance_period_name.as_deref(), Some("6 Bulan"));
    }

    #[test]
    fn test_create_asset_hash_failure_rolls_back() {
        let (_temp, store) = open_store();
        let classification = seed_classification(&store);

        let failing = |_: i64| -> Result<String> { Err(Error::Internal("boom".into())) };
        let result = store.create_asset(&new_asset("Laptop", classification.classification_id), &failing);
        assert!(result.is_err());
        assert!(store.list_all_assets().unwrap().is_empty());
    }

    #[test]
    fn test_asset_ids_are_sequential() {
        let (_temp, store) = open_store();
        let classification = seed_classification(&store);

        let first = store
            .create_asset(&new_asset("A", classification.classification_id), &hash_plain)
            .unwrap();
        let second = store
            .create_asset(&new_asset("B", classification.classification_id), &hash_plain)
            .unwrap();
        assert!(second.asset_id > first.asset_id);
    }

    #[test]
    fn test_update_asset_status_writes_audit() {
        let (_temp, store) = open_store();
        let classification = seed_classification(&store);
        let asset = store
            .create_asset(&new_asset("Laptop", classification.classification_id), &hash_plain)
            .unwrap();

        store
            .update_asset_status(asset.asset_id, "Rusak", None, Utc::now())
            .unwrap();
        store
            .update_asset_status(asset.asset_id, GOOD_STATUS, Some(date(2025, 1, 20)), Utc::now())
            .unwrap();

        let fetched = store.get_asset(asset.asset_id).unwrap().unwrap();
        assert_eq!(fetched.asset.asset_status, GOOD_STATUS);
        assert_eq!(fetched.asset.asset_maintenance_date, date(2025, 1, 20));

        let updates = store.list_asset_updates(asset.asset_id).unwrap();
        let statuses: Vec<_> = updates.iter().map(|u| u.asset_status.as_str()).collect();
        assert_eq!(statuses, ["Rusak", GOOD_STATUS]);
    }

    #[test]
    fn test_update_missing_asset_is_not_found() {
        let (_temp, store) = open_store();
        let result = store.update_asset_status(42, "Rusak", None, Utc::now());
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(store.list_asset_updates(42).unwrap().is_empty());
    }

    #[test]
    fn test_list_assets_partition_and_scope() {
        let (_temp, store) = open_store();
        let classification = seed_classification(&store);
        let area = store.create_area("Utara").unwrap();
        let outlet = store.create_outlet("Outlet A", Some(area.area_id)).unwrap();

        for i in 0..3 {
            let mut asset = new_asset(&format!("Laptop {i}"), classification.classification_id);
            if i == 0 {
                asset.area_id = Some(area.area_id);
                asset.outlet_id = Some(outlet.outlet_id);
            }
            store.create_asset(&asset, &hash_plain).unwrap();
        }

        // Force one asset into the perkap partition.
        store
            .conn()
            .execute(
                "INSERT INTO classifications (classification_id, classification_name,
                    classification_economic_value) VALUES (?1, 'Perkap', 24)",
                params![PERKAP_CLASSIFICATION_ID],
            )
            .unwrap();
        store
            .create_asset(&new_asset("Meja", PERKAP_CLASSIFICATION_ID), &hash_plain)
            .unwrap();

        let general = AssetFilter {
            q: None,
            scope: Scope::Global,
            partition: AssetPartition::General,
        };
        let page = store.list_assets(&general, PageRequest::default()).unwrap();
        assert_eq!(page.total, 3);

        let perkap = AssetFilter {
            partition: AssetPartition::Perkap,
            ..general.clone()
        };
        let page = store.list_assets(&perkap, PageRequest::default()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].asset.asset_name, "Meja");

        let scoped = AssetFilter {
            scope: Scope::Outlet(outlet.outlet_id),
            ..general.clone()
        };
        let page = store.list_assets(&scoped, PageRequest::default()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].outlet_name.as_deref(), Some("Outlet A"));
        assert_eq!(page.items[0].area_name.as_deref(), Some("Utara"));

        let search = AssetFilter {
            q: Some("top 2".to_string()),
            ..general
        };
        let page = store.list_assets(&search, PageRequest::default()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].asset.asset_name, "Laptop 2");
    }

    #[test]
    fn test_list_assets_second_page() {
        let (_temp, store) = open_store();
        let classification = seed_classification(&store);
        for i in 1..=25 {
            store
                .create_asset(
                    &new_asset(&format!("Asset {i:02}"), classification.classification_id),
                    &hash_plain,
                )
                .unwrap();
        }

        let filter = AssetFilter {
            q: None,
            scope: Scope::Global,
            partition: AssetPartition::General,
        };
        let page_request = PageRequest { number: 2, size: 10 };
        let page = store.list_assets(&filter, page_request).unwrap();

        assert_eq!(page.total, 25);
        let names: Vec<_> = page.items.iter().map(|a| a.asset.asset_name.clone()).collect();
        let expected: Vec<_> = (11..=20).map(|i| format!("Asset {i:02}")).collect();
        assert_eq!(names, expected);
        assert_eq!(
            page_request.next_page_token(page.total),
            Some("page_token_3".to_string())
        );
    }

    #[test]
    fn test_create_submission_cascade() {
        let (_temp, store) = open_store();
        let classification = seed_classification(&store);
        let asset = store
            .create_asset(&new_asset("Laptop", classification.classification_id), &hash_plain)
            .unwrap();

        let submission = store.create_submission(&new_submission(&asset)).unwrap();
        assert_eq!(submission.asset_id, asset.asset_id);

        let logs = store.list_submission_logs(submission.submission_id).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, SUBMITTED_LOG_STATUS);
        assert_eq!(logs[0].description, "Layar berkedip");

        let fetched = store.get_asset(asset.asset_id).unwrap().unwrap();
        assert_eq!(fetched.asset.asset_status, "Pengajuan Service");
        assert_eq!(store.list_asset_updates(asset.asset_id).unwrap().len(), 1);
    }

    #[test]
    fn test_create_submission_for_missing_asset_rolls_back() {
        let (_temp, store) = open_store();
        let classification = seed_classification(&store);
        let asset = store
            .create_asset(&new_asset("Laptop", classification.classification_id), &hash_plain)
            .unwrap();
        let mut submission = new_submission(&asset);
        submission.asset_id = 999;

        assert!(store.create_submission(&submission).is_err());
        let filter = SubmissionFilter::default();
        assert_eq!(store.list_submissions(&filter, PageRequest::default()).unwrap().total, 0);
    }

    #[test]
    fn test_update_submission_status_cascade() {
        let (_temp, store) = open_store();
        let classification = seed_classification(&store);
        let asset = store
            .create_asset(&new_asset("Laptop", classification.classification_id), &hash_plain)
            .unwrap();
        let submission = store.create_submission(&new_submission(&asset)).unwrap();

        let updated = store
            .update_submission_status(submission.submission_id, "Disetujui", "Sari", Utc::now())
            .unwrap();
        assert_eq!(updated.submission_status, "Disetujui");

        let logs = store.list_submission_logs(submission.submission_id).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].description, "Status updated to Disetujui");
        assert_eq!(logs[1].pr_name, "Sari");

        let fetched = store.get_asset(asset.asset_id).unwrap().unwrap();
        assert_eq!(fetched.asset.asset_status, "Disetujui");
        assert_eq!(store.list_asset_updates(asset.asset_id).unwrap().len(), 2);

        let missing = store.update_submission_status(999, "Disetujui", "Sari", Utc::now());
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_submission_parent_groups_submissions() {
        let (_temp, store) = open_store();
        let classification = seed_classification(&store);
        let asset = store
            .create_asset(&new_asset("Laptop", classification.classification_id), &hash_plain)
            .unwrap();
        let first = store.create_submission(&new_submission(&asset)).unwrap();
        let second = store.create_submission(&new_submission(&asset)).unwrap();

        let parent = NewSubmissionParent {
            nip: "1001".to_string(),
            outlet_id: None,
            area_id: None,
            created_at: Utc::now(),
        };
        let parent_id = store
            .create_submission_parent(&parent, &[first.submission_id, second.submission_id])
            .unwrap();

        let grouped = SubmissionFilter {
            grouped: true,
            ..Default::default()
        };
        assert_eq!(store.list_submissions(&grouped, PageRequest::default()).unwrap().total, 2);

        let by_parent = SubmissionFilter {
            submission_parent_id: Some(parent_id),
            ..Default::default()
        };
        assert_eq!(store.list_submissions(&by_parent, PageRequest::default()).unwrap().total, 2);

        let ungrouped = SubmissionFilter::default();
        assert_eq!(store.list_submissions(&ungrouped, PageRequest::default()).unwrap().total, 0);

        let parents = store
            .list_submission_parents(&SubmissionParentFilter::default(), PageRequest::default())
            .unwrap();
        assert_eq!(parents.total, 1);
        assert_eq!(parents.items[0].submission_parent_id, parent_id);
    }

    #[test]
    fn test_submission_parent_unknown_id_rolls_back() {
        let (_temp, store) = open_store();
        let parent = NewSubmissionParent {
            nip: "1001".to_string(),
            outlet_id: None,
            area_id: None,
            created_at: Utc::now(),
        };
        let result = store.create_submission_parent(&parent, &[404]);
        assert!(matches!(result, Err(Error::NotFound(_))));

        let parents = store
            .list_submission_parents(&SubmissionParentFilter::default(), PageRequest::default())
            .unwrap();
        assert_eq!(parents.total, 0);
    }

    #[test]
    fn test_notification_lookup_ignores_submitted() {
        let (_temp, store) = open_store();
        let classification = seed_classification(&store);
        let asset = store
            .create_asset(&new_asset("Laptop", classification.classification_id), &hash_plain)
            .unwrap();

        store
            .insert_notification(&NewNotification {
                asset_id: asset.asset_id,
                submission_id: None,
                status: NotificationStatus::Submitted,
                asset_name: asset.asset_name.clone(),
                outlet_id: None,
                area_id: None,
                maintenance_or_submitted: date(2024, 6, 1),
            })
            .unwrap();

        assert!(store.find_maintenance_notification(asset.asset_id).unwrap().is_none());
        assert!(store.has_submitted_notification(asset.asset_id).unwrap());

        let id = store
            .insert_notification(&NewNotification {
                asset_id: asset.asset_id,
                submission_id: None,
                status: NotificationStatus::Waiting,
                asset_name: asset.asset_name.clone(),
                outlet_id: None,
                area_id: None,
                maintenance_or_submitted: date(2024, 6, 20),
            })
            .unwrap();
        store
            .update_notification(id, NotificationStatus::Late, date(2024, 6, 20))
            .unwrap();

        let found = store.find_maintenance_notification(asset.asset_id).unwrap().unwrap();
        assert_eq!(found.id_notification, id);
        assert_eq!(found.status, NotificationStatus::Late);

        let counts = store.count_notifications(Scope::Global, None).unwrap();
        assert_eq!(counts.total_late, 1);
        assert_eq!(counts.total_submitted, 1);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn test_user_crud() {
        let (_temp, store) = open_store();
        let area = store.create_area("Utara").unwrap();

        let user = User {
            nip: "1001".to_string(),
            user_full_name: "Budi Santoso".to_string(),
            user_email: "budi@example.com".to_string(),
            user_password: "$argon2id$placeholder".to_string(),
            role_id: KnownRole::AreaManager.id(),
            area_id: Some(area.area_id),
            outlet_id: Some(0),
        };
        store.create_user(&user).unwrap();

        let fetched = store.get_user("1001").unwrap().unwrap();
        assert_eq!(fetched.user_full_name, "Budi Santoso");
        assert_eq!(fetched.role_name.as_deref(), Some("Area Manager"));
        assert_eq!(fetched.area_id, Some(area.area_id));
        assert_eq!(fetched.outlet_id, None);

        assert!(matches!(store.create_user(&user), Err(Error::AlreadyExists(_))));

        let page = store.list_users(Some("budi@"), PageRequest::default()).unwrap();
        assert_eq!(page.total, 1);

        assert!(store.delete_user("1001").unwrap());
        assert!(!store.delete_user("1001").unwrap());
    }

    #[test]
    fn test_expired_tokens_swept() {
        let (_temp, store) = open_store();
        let now = Utc::now();

        store
            .insert_token(&StoredToken {
                token: "old".to_string(),
                created_at: now - Duration::hours(80),
                exp_token: now - Duration::hours(8),
            })
            .unwrap();
        store
            .insert_token(&StoredToken {
                token: "fresh".to_string(),
                created_at: now,
                exp_token: now + Duration::hours(72),
            })
            .unwrap();

        assert_eq!(store.delete_expired_tokens(now).unwrap(), 1);
        assert!(store.get_token("old").unwrap().is_none());
        assert!(store.get_token("fresh").unwrap().is_some());
    }
}
