//! Date and depreciation arithmetic for the asset lifecycle.
//!
//! Everything here is pure: callers pass "today" explicitly.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::{Error, Result};

/// Day of the month every scheduled maintenance falls on.
pub const MAINTENANCE_DAY: u32 = 20;

/// Days before the maintenance date at which an asset starts waiting.
pub const WAITING_WINDOW_DAYS: i64 = 7;

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Whole calendar months from `from` to `to`. Both dates are truncated to the
/// first of their month, so 31 Jan to 1 Feb counts as one month. Returns 0
/// when `from` is not before `to`.
#[must_use]
pub fn months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let mut cursor = first_of_month(from);
    let target = first_of_month(to);

    let mut months = 0;
    while cursor < target {
        match cursor.checked_add_months(Months::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
        months += 1;
    }
    months
}

/// Whole months elapsed from `from` to `to`: a month only counts once its
/// day of the month has been reached, so 31 Jan to 1 Feb is zero.
#[must_use]
pub fn completed_months(from: NaiveDate, to: NaiveDate) -> u32 {
    let months = months_between(from, to);
    match from.checked_add_months(Months::new(months)) {
        Some(anniversary) if anniversary > to => months.saturating_sub(1),
        _ => months,
    }
}

/// Per-month depreciation: acquisition value divided by the classification's
/// economic value, truncated.
pub fn deprecation_value(acquisition_value: i64, economic_value: i64) -> Result<i64> {
    if economic_value <= 0 {
        return Err(Error::invalid(
            "classification economic value must be greater than zero",
        ));
    }
    Ok(acquisition_value / economic_value)
}

pub fn last_book_value(acquisition_value: i64, deprecation_value: i64, months: u32) -> Result<i64> {
    deprecation_value
        .checked_mul(i64::from(months))
        .and_then(|depreciated| acquisition_value.checked_sub(depreciated))
        .ok_or_else(|| Error::invalid("classification_acquisition_value is too large"))
}

/// Depreciation and last book value of an asset at a given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Valuation {
    pub deprecation_value: i64,
    pub last_book_value: i64,
}

pub fn valuate(
    acquisition_value: i64,
    economic_value: i64,
    purchase_date: NaiveDate,
    today: NaiveDate,
) -> Result<Valuation> {
    let deprecation = deprecation_value(acquisition_value, economic_value)?;
    let months = months_between(purchase_date, today);
    Ok(Valuation {
        deprecation_value: deprecation,
        last_book_value: last_book_value(acquisition_value, deprecation, months)?,
    })
}

/// `period_months` after `today`'s month, pinned to day 20.
#[must_use]
pub fn next_maintenance_date(today: NaiveDate, period_months: u32) -> NaiveDate {
    let anchor = first_of_month(today);
    let target = anchor
        .checked_add_months(Months::new(period_months))
        .unwrap_or(anchor);
    target.with_day(MAINTENANCE_DAY).unwrap_or(target)
}

/// Where an asset stands relative to its maintenance date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceState {
    Normal,
    Waiting,
    Late,
}

#[must_use]
pub fn classify_maintenance(maintenance_date: NaiveDate, today: NaiveDate) -> MaintenanceState {
    let days = (maintenance_date - today).num_days();
    if days < 0 {
        MaintenanceState::Late
    } else if days <= WAITING_WINDOW_DAYS {
        MaintenanceState::Waiting
    } else {
        MaintenanceState::Normal
    }
}

/// Parses a `YYYY-MM-DD` date supplied by a client.
pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| Error::invalid(format!("{field} must be a date in YYYY-MM-DD format")))
}
