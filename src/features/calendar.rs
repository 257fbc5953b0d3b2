//! Month-cadence date arithmetic shared by both backends.
//!
//! Future periods are placed one calendar month apart, starting the month after
//! the last historical date:
//!
//! - a month-end anchor (e.g. `2020-04-30`) yields month ends (`2020-05-31`, ...)
//! - any other anchor keeps its day-of-month, clamped to shorter months

use chrono::{Datelike, Months, NaiveDate};

/// Whether `date` is the last day of its month.
pub fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().is_none_or(|next| next.month() != date.month())
}

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

/// Months since year 0; consecutive calendar months differ by exactly one.
pub fn month_ordinal(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// The `horizon` monthly dates following `last`.
///
/// Dates beyond chrono's representable range are omitted; the result adapter
/// rejects a short sequence.
pub fn future_month_dates(last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    let month_end_anchor = is_month_end(last);
    (1..=horizon as u32)
        .filter_map(|k| {
            let d = last.checked_add_months(Months::new(k))?;
            Some(if month_end_anchor { month_end(d) } else { d })
        })
        .collect()
}
