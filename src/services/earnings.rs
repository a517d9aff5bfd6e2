use chrono::{Datelike, Duration, NaiveDateTime};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Earnings;
use crate::services::pricing::round2;

/// Buckets payouts by completion time. Weeks start on Sunday.
pub fn summarize(payouts: &[(f64, NaiveDateTime)], now: &NaiveDateTime) -> Earnings {
    let today_start = now.date().and_time(chrono::NaiveTime::MIN);
    let week_start =
        today_start - Duration::days(now.weekday().num_days_from_sunday() as i64);
    let month_start = today_start - Duration::days(now.day0() as i64);

    let mut earnings = Earnings::default();
    for (amount, completed_at) in payouts {
        earnings.total += amount;
        earnings.completed_count += 1;

        if completed_at > now {
            continue;
        }
        if *completed_at >= today_start {
            earnings.today += amount;
        }
        if *completed_at >= week_start {
            earnings.this_week += amount;
        }
        if *completed_at >= month_start {
            earnings.this_month += amount;
        }
    }

    earnings.today = round2(earnings.today);
    earnings.this_week = round2(earnings.this_week);
    earnings.this_month = round2(earnings.this_month);
    earnings.total = round2(earnings.total);
    earnings
}

pub fn for_provider(
    conn: &Connection,
    provider_id: &str,
    now: &NaiveDateTime,
) -> Result<Earnings, AppError> {
    let payouts = queries::get_completed_payouts(conn, provider_id)?;
    Ok(summarize(&payouts, now))
}
