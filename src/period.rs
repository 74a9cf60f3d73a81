//! Date bucket naming.
//!
//! Turns a creation timestamp and a [`Period`] into the name of the folder the
//! timestamp belongs in, for example `"March 2024"`, `"January - March 2024"`,
//! `"05 January 2024"` or `"01 Jan - 07 Jan 2024"`.
//!
//! Month buckets follow the calendar. Day and week buckets have a fixed length
//! and are counted from Monday 1969-12-29 in local time, so week buckets always
//! start on a Monday and single-day buckets are local calendar days.

use crate::plan::{Period, PeriodKind, PlanError};
use chrono::{DateTime, Datelike, Days, Local, Month, NaiveDate, TimeZone};

const SECONDS_PER_DAY: i64 = 86_400;

/// Distance from the Unix epoch (a Thursday) back to the preceding Monday.
const SHIFT_TO_MONDAY: i64 = 3 * SECONDS_PER_DAY;

/// Computes the bucket label for `timestamp` in the given time zone.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use dirsort::period::period_label;
/// use dirsort::plan::{Period, PeriodKind};
///
/// // 2024-03-15 12:00:00 UTC
/// let ts = 1_710_504_000;
/// let month = Period::new(PeriodKind::Month, 1).unwrap();
/// assert_eq!(period_label(ts, &month, &Utc).unwrap(), "March 2024");
///
/// let week = Period::new(PeriodKind::Week, 1).unwrap();
/// assert_eq!(period_label(ts, &week, &Utc).unwrap(), "11 Mar - 17 Mar 2024");
/// ```
pub fn period_label<Tz: TimeZone>(
    timestamp: i64,
    period: &Period,
    tz: &Tz,
) -> Result<String, PlanError> {
    let local_seconds = local_seconds(timestamp, tz)?;
    match period.kind() {
        PeriodKind::Month => month_label(local_seconds, period.amount()),
        PeriodKind::Day => day_week_label(local_seconds, period.amount(), 1),
        PeriodKind::Week => day_week_label(local_seconds, period.amount(), 7),
    }
}

/// Computes the bucket label in the system's local time zone.
pub fn period_label_local(timestamp: i64, period: &Period) -> Result<String, PlanError> {
    period_label(timestamp, period, &Local)
}

/// Wall-clock seconds: `timestamp` shifted by the zone's UTC offset at that instant.
fn local_seconds<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Result<i64, PlanError> {
    let instant = tz
        .timestamp_opt(timestamp, 0)
        .single()
        .ok_or(PlanError::TimestampOutOfRange(timestamp))?;
    Ok(instant.naive_local().and_utc().timestamp())
}

fn wall_clock_date(local_seconds: i64) -> Result<NaiveDate, PlanError> {
    DateTime::from_timestamp(local_seconds, 0)
        .map(|dt| dt.date_naive())
        .ok_or(PlanError::TimestampOutOfRange(local_seconds))
}

fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown")
}

/// Calendar month buckets of `amount` months, anchored at January.
///
/// A bucket never extends past December: the last bucket of a year is cut
/// short when 12 is not a multiple of `amount`.
pub fn month_label(local_seconds: i64, amount: u32) -> Result<String, PlanError> {
    let date = wall_clock_date(local_seconds)?;
    let amount = amount.max(1);
    let start = (date.month() - 1) / amount * amount + 1;
    let end = (start + amount - 1).min(12);

    if start == end {
        return Ok(format!("{} {}", month_name(start), date.year()));
    }
    Ok(format!(
        "{} - {} {}",
        month_name(start),
        month_name(end),
        date.year()
    ))
}

/// Fixed-length buckets of `amount * days_per_unit` days starting on Mondays.
pub fn day_week_label(
    local_seconds: i64,
    amount: u32,
    days_per_unit: u32,
) -> Result<String, PlanError> {
    let days = i64::from(amount.max(1)) * i64::from(days_per_unit);
    let bucket_seconds = days * SECONDS_PER_DAY;

    let start_seconds =
        (local_seconds + SHIFT_TO_MONDAY).div_euclid(bucket_seconds) * bucket_seconds
            - SHIFT_TO_MONDAY;
    let start = wall_clock_date(start_seconds)?;

    if days == 1 {
        return Ok(format!("{} {}", start.format("%d %B"), start.year()));
    }

    // days >= 2 here, so the subtraction cannot underflow
    let end = start
        .checked_add_days(Days::new((days - 1) as u64))
        .ok_or(PlanError::TimestampOutOfRange(local_seconds))?;
    Ok(format!(
        "{} - {} {}",
        start.format("%d %b"),
        end.format("%d %b"),
        end.year()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> i64 {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
            .and_utc()
            .timestamp()
    }

    fn period(kind: PeriodKind, amount: u32) -> Period {
        Period::new(kind, amount).unwrap()
    }

    #[test]
    fn test_single_month() {
        let p = period(PeriodKind::Month, 1);
        assert_eq!(
            period_label(ts(2024, 3, 15, 10, 0), &p, &Utc).unwrap(),
            "March 2024"
        );
        assert_eq!(
            period_label(ts(2024, 1, 1, 0, 0), &p, &Utc).unwrap(),
            "January 2024"
        );
        assert_eq!(
            period_label(ts(2023, 12, 31, 23, 59), &p, &Utc).unwrap(),
            "December 2023"
        );
    }

    #[test]
    fn test_month_buckets_anchor_at_january() {
        let p = period(PeriodKind::Month, 3);
        assert_eq!(
            period_label(ts(2024, 2, 10, 0, 0), &p, &Utc).unwrap(),
            "January - March 2024"
        );
        assert_eq!(
            period_label(ts(2024, 4, 1, 0, 0), &p, &Utc).unwrap(),
            "April - June 2024"
        );
        assert_eq!(
            period_label(ts(2024, 12, 25, 0, 0), &p, &Utc).unwrap(),
            "October - December 2024"
        );
    }

    #[test]
    fn test_month_boundary_between_buckets() {
        let p = period(PeriodKind::Month, 3);
        let last_of_march = period_label(ts(2024, 3, 31, 23, 0), &p, &Utc).unwrap();
        let first_of_april = period_label(ts(2024, 4, 1, 1, 0), &p, &Utc).unwrap();
        assert_ne!(last_of_march, first_of_april);
    }

    #[test]
    fn test_month_boundary_within_bucket() {
        let p = period(PeriodKind::Month, 2);
        let last_of_january = period_label(ts(2024, 1, 31, 23, 0), &p, &Utc).unwrap();
        let first_of_february = period_label(ts(2024, 2, 1, 1, 0), &p, &Utc).unwrap();
        assert_eq!(last_of_january, first_of_february);
        assert_eq!(last_of_january, "January - February 2024");
    }

    #[test]
    fn test_month_bucket_is_clamped_to_december() {
        let p = period(PeriodKind::Month, 5);
        assert_eq!(
            period_label(ts(2024, 11, 3, 0, 0), &p, &Utc).unwrap(),
            "November - December 2024"
        );

        let p = period(PeriodKind::Month, 11);
        assert_eq!(
            period_label(ts(2024, 12, 3, 0, 0), &p, &Utc).unwrap(),
            "December 2024"
        );

        let p = period(PeriodKind::Month, 24);
        assert_eq!(
            period_label(ts(2024, 7, 3, 0, 0), &p, &Utc).unwrap(),
            "January - December 2024"
        );
    }

    #[test]
    fn test_month_uses_local_offset() {
        let p = period(PeriodKind::Month, 1);
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        // 23:00 UTC on Jan 31 is already February in UTC+2
        let t = ts(2024, 1, 31, 23, 0);
        assert_eq!(period_label(t, &p, &Utc).unwrap(), "January 2024");
        assert_eq!(period_label(t, &p, &plus_two).unwrap(), "February 2024");
    }

    #[test]
    fn test_single_day() {
        let p = period(PeriodKind::Day, 1);
        assert_eq!(
            period_label(ts(2024, 1, 5, 12, 0), &p, &Utc).unwrap(),
            "05 January 2024"
        );
    }

    #[test]
    fn test_single_day_same_local_day_23_hours_apart() {
        let p = period(PeriodKind::Day, 1);
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        // 00:30 and 23:30 local time on 3 Jan 2024 in UTC+2
        let morning = ts(2024, 1, 3, 0, 30) - 2 * 3600;
        let night = morning + 23 * 3600;
        let a = period_label(morning, &p, &plus_two).unwrap();
        let b = period_label(night, &p, &plus_two).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, "03 January 2024");

        let next_day = morning + 25 * 3600;
        assert_eq!(
            period_label(next_day, &p, &plus_two).unwrap(),
            "04 January 2024"
        );
    }

    #[test]
    fn test_multi_day_buckets() {
        let p = period(PeriodKind::Day, 3);
        // Buckets of three days counted from Monday 1969-12-29
        assert_eq!(
            period_label(ts(2024, 1, 1, 8, 0), &p, &Utc).unwrap(),
            "31 Dec - 02 Jan 2024"
        );
        assert_eq!(
            period_label(ts(2024, 1, 3, 8, 0), &p, &Utc).unwrap(),
            "03 Jan - 05 Jan 2024"
        );
    }

    #[test]
    fn test_week_starts_on_monday() {
        let p = period(PeriodKind::Week, 1);
        // Monday 1 Jan 2024 through Sunday 7 Jan 2024
        for day in 1..=7 {
            assert_eq!(
                period_label(ts(2024, 1, day, 13, 0), &p, &Utc).unwrap(),
                "01 Jan - 07 Jan 2024"
            );
        }
        assert_eq!(
            period_label(ts(2024, 1, 8, 0, 0), &p, &Utc).unwrap(),
            "08 Jan - 14 Jan 2024"
        );
    }

    #[test]
    fn test_week_crossing_year_uses_end_year() {
        let p = period(PeriodKind::Week, 1);
        assert_eq!(
            period_label(ts(2024, 12, 31, 9, 0), &p, &Utc).unwrap(),
            "30 Dec - 05 Jan 2025"
        );
    }

    #[test]
    fn test_week_in_negative_offset() {
        let p = period(PeriodKind::Week, 1);
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        // 02:00 UTC Monday 8 Jan is still Sunday 7 Jan in UTC-5
        let t = ts(2024, 1, 8, 2, 0);
        assert_eq!(period_label(t, &p, &Utc).unwrap(), "08 Jan - 14 Jan 2024");
        assert_eq!(
            period_label(t, &p, &minus_five).unwrap(),
            "01 Jan - 07 Jan 2024"
        );
    }

    #[test]
    fn test_two_week_buckets() {
        let p = period(PeriodKind::Week, 2);
        let a = period_label(ts(2024, 1, 2, 0, 0), &p, &Utc).unwrap();
        let b = period_label(ts(2024, 1, 9, 0, 0), &p, &Utc).unwrap();
        assert_eq!(a, b);
        assert!(a.ends_with("2024"));
    }

    #[test]
    fn test_before_epoch() {
        let p = period(PeriodKind::Week, 1);
        assert_eq!(
            period_label(ts(1969, 12, 31, 0, 0), &p, &Utc).unwrap(),
            "29 Dec - 04 Jan 1970"
        );
    }

    #[test]
    fn test_label_is_deterministic() {
        let p = period(PeriodKind::Week, 3);
        let t = ts(2021, 6, 17, 4, 30);
        assert_eq!(
            period_label(t, &p, &Utc).unwrap(),
            period_label(t, &p, &Utc).unwrap()
        );
    }

    #[test]
    fn test_out_of_range_timestamp() {
        let p = period(PeriodKind::Month, 1);
        assert_eq!(
            period_label(i64::MAX, &p, &Utc),
            Err(PlanError::TimestampOutOfRange(i64::MAX))
        );
    }
}
