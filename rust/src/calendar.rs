//! Workday calendar arithmetic.
//!
//! The calendar is a plain Monday-Friday workweek: Saturday and Sunday are the
//! only non-working days. There is no holiday list. All functions operate on
//! `NaiveDate`, so time-of-day never enters the arithmetic.
//!
//! Offsets are computed in closed form (whole weeks plus a remainder), so the
//! cost does not depend on how far a date moves. Results that fall outside
//! the range `NaiveDate` can represent are reported as errors.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use thiserror::Error;

/// Errors from calendar arithmetic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("moving {date} by {workdays} workdays leaves the supported date range")]
    OutOfRange { date: NaiveDate, workdays: i64 },
}

/// Whether `date` falls on Monday through Friday.
#[inline]
pub fn is_workday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn out_of_range(date: NaiveDate, workdays: i64) -> CalendarError {
    CalendarError::OutOfRange { date, workdays }
}

/// Calendar days spanned by `n` workdays counted from a workday, where
/// `crosses_weekend` says whether the partial week wraps past a Friday.
fn span_days(n: u64, crosses_weekend: bool) -> Option<u64> {
    let days = (n / 5).checked_mul(7)?.checked_add(n % 5)?;
    if crosses_weekend {
        days.checked_add(2)
    } else {
        Some(days)
    }
}

/// First workday on or after `date`.
pub fn next_workday(date: NaiveDate) -> Result<NaiveDate, CalendarError> {
    let skip = match date.weekday() {
        Weekday::Sat => 2,
        Weekday::Sun => 1,
        _ => return Ok(date),
    };
    date.checked_add_days(Days::new(skip))
        .ok_or_else(|| out_of_range(date, 0))
}

fn checked_add_workdays(date: NaiveDate, n: u64) -> Option<NaiveDate> {
    // Counting from a weekend day is the same as counting from the Friday before it.
    let base = match date.weekday() {
        Weekday::Sat => date.checked_sub_days(Days::new(1))?,
        Weekday::Sun => date.checked_sub_days(Days::new(2))?,
        _ => date,
    };
    let weekday = u64::from(base.weekday().num_days_from_monday());
    let days = span_days(n, weekday + n % 5 >= 5)?;
    base.checked_add_days(Days::new(days))
}

fn checked_subtract_workdays(date: NaiveDate, n: u64) -> Option<NaiveDate> {
    // Counting back from a weekend day is the same as from the Monday after it.
    let base = match date.weekday() {
        Weekday::Sat => date.checked_add_days(Days::new(2))?,
        Weekday::Sun => date.checked_add_days(Days::new(1))?,
        _ => date,
    };
    let weekday = u64::from(base.weekday().num_days_from_monday());
    let days = span_days(n, weekday < n % 5)?;
    base.checked_sub_days(Days::new(days))
}

/// Advance `n` business days from `date`. `n <= 0` returns `date` unchanged.
pub fn add_workdays(date: NaiveDate, n: i64) -> Result<NaiveDate, CalendarError> {
    if n <= 0 {
        return Ok(date);
    }
    checked_add_workdays(date, n.unsigned_abs()).ok_or_else(|| out_of_range(date, n))
}

/// Step back `n` business days from `date`. `n <= 0` returns `date` unchanged.
pub fn subtract_workdays(date: NaiveDate, n: i64) -> Result<NaiveDate, CalendarError> {
    if n <= 0 {
        return Ok(date);
    }
    checked_subtract_workdays(date, n.unsigned_abs()).ok_or_else(|| out_of_range(date, -n))
}

/// Move `date` by a signed number of workdays (a lag).
pub fn shift_workdays(date: NaiveDate, lag: i64) -> Result<NaiveDate, CalendarError> {
    if lag >= 0 {
        add_workdays(date, lag)
    } else {
        checked_subtract_workdays(date, lag.unsigned_abs()).ok_or_else(|| out_of_range(date, lag))
    }
}

/// Number of business days in `[start, end]`, inclusive. Zero when `start > end`.
pub fn count_workdays(start: NaiveDate, end: NaiveDate) -> i64 {
    if start > end {
        return 0;
    }
    let total = (end - start).num_days() + 1;
    let first = i64::from(start.weekday().num_days_from_monday());
    let partial = (0..total % 7)
        .filter(|offset| (first + offset) % 7 < 5)
        .count() as i64;
    total / 7 * 5 + partial
}

/// Finish date of an activity of `duration` workdays starting on `start`.
///
/// A 1-day activity starts and ends on the same day; zero-duration
/// milestones finish on their start date.
pub fn finish_date(start: NaiveDate, duration: u32) -> Result<NaiveDate, CalendarError> {
    if duration == 0 {
        Ok(start)
    } else {
        add_workdays(start, i64::from(duration) - 1)
    }
}

/// Start date of an activity of `duration` workdays finishing on `finish`.
pub fn start_date(finish: NaiveDate, duration: u32) -> Result<NaiveDate, CalendarError> {
    if duration == 0 {
        Ok(finish)
    } else {
        subtract_workdays(finish, i64::from(duration) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn add(date: NaiveDate, n: i64) -> NaiveDate {
        add_workdays(date, n).unwrap()
    }

    fn sub(date: NaiveDate, n: i64) -> NaiveDate {
        subtract_workdays(date, n).unwrap()
    }

    // Day-by-day reference implementations.
    fn stepping_add(date: NaiveDate, n: i64) -> NaiveDate {
        let mut current = date;
        let mut added = 0;
        while added < n {
            current = current.succ_opt().unwrap();
            if is_workday(current) {
                added += 1;
            }
        }
        current
    }

    fn stepping_sub(date: NaiveDate, n: i64) -> NaiveDate {
        let mut current = date;
        let mut removed = 0;
        while removed < n {
            current = current.pred_opt().unwrap();
            if is_workday(current) {
                removed += 1;
            }
        }
        current
    }

    // 2025-01-06 is a Monday.

    #[test]
    fn test_is_workday() {
        assert!(is_workday(d(2025, 1, 6)));
        assert!(is_workday(d(2025, 1, 10)));
        assert!(!is_workday(d(2025, 1, 11)));
        assert!(!is_workday(d(2025, 1, 12)));
    }

    #[test]
    fn test_next_workday_normalizes_weekend() {
        assert_eq!(next_workday(d(2025, 1, 11)), Ok(d(2025, 1, 13)));
        assert_eq!(next_workday(d(2025, 1, 12)), Ok(d(2025, 1, 13)));
        assert_eq!(next_workday(d(2025, 1, 8)), Ok(d(2025, 1, 8)));
    }

    #[test]
    fn test_add_workdays_within_week() {
        assert_eq!(add(d(2025, 1, 6), 4), d(2025, 1, 10));
    }

    #[test]
    fn test_add_workdays_skips_weekend() {
        // Friday + 1 -> Monday
        assert_eq!(add(d(2025, 1, 10), 1), d(2025, 1, 13));
        assert_eq!(add(d(2025, 1, 8), 5), d(2025, 1, 15));
        // Saturday + 1 -> Monday
        assert_eq!(add(d(2025, 1, 11), 1), d(2025, 1, 13));
    }

    #[test]
    fn test_add_workdays_non_positive_is_identity() {
        assert_eq!(add(d(2025, 1, 11), 0), d(2025, 1, 11));
        assert_eq!(add(d(2025, 1, 8), -3), d(2025, 1, 8));
    }

    #[test]
    fn test_subtract_workdays_skips_weekend() {
        // Monday - 1 -> Friday
        assert_eq!(sub(d(2025, 1, 13), 1), d(2025, 1, 10));
        assert_eq!(sub(d(2025, 1, 15), 5), d(2025, 1, 8));
        assert_eq!(sub(d(2025, 1, 15), 0), d(2025, 1, 15));
        // Sunday - 1 -> Friday
        assert_eq!(sub(d(2025, 1, 12), 1), d(2025, 1, 10));
    }

    #[test]
    fn test_closed_form_matches_day_stepping() {
        // Two full weeks of start days, weekends included.
        for offset in 0..14 {
            let start = d(2025, 1, 4 + offset);
            for n in 0..40 {
                assert_eq!(add(start, n), stepping_add(start, n), "{start} + {n}");
                assert_eq!(sub(start, n), stepping_sub(start, n), "{start} - {n}");
            }
        }
    }

    #[test]
    fn test_shift_workdays_signed() {
        assert_eq!(shift_workdays(d(2025, 1, 9), 2), Ok(d(2025, 1, 13)));
        assert_eq!(shift_workdays(d(2025, 1, 13), -2), Ok(d(2025, 1, 9)));
        assert_eq!(shift_workdays(d(2025, 1, 13), 0), Ok(d(2025, 1, 13)));
    }

    #[test]
    fn test_large_offsets_are_fast_and_exact() {
        // 52 weeks of workdays is exactly 364 calendar days.
        assert_eq!(add(d(2025, 1, 6), 260), d(2026, 1, 5));
        assert_eq!(sub(d(2026, 1, 5), 260), d(2025, 1, 6));
        let far = add(d(2025, 1, 6), 10_000_000);
        assert_eq!(sub(far, 10_000_000), d(2025, 1, 6));
    }

    #[test]
    fn test_out_of_range_is_an_error() {
        let start = d(2025, 1, 6);
        assert_eq!(
            add_workdays(start, 2_000_000_000),
            Err(CalendarError::OutOfRange {
                date: start,
                workdays: 2_000_000_000
            })
        );
        assert!(subtract_workdays(start, 2_000_000_000).is_err());
        assert!(shift_workdays(start, -2_000_000_000).is_err());
        assert!(shift_workdays(start, i64::MIN).is_err());
        assert!(finish_date(start, u32::MAX).is_err());
    }

    #[test]
    fn test_count_workdays_pure_weekdays() {
        for k in 1..=5 {
            let end = d(2025, 1, 6 + k - 1);
            assert_eq!(count_workdays(d(2025, 1, 6), end), i64::from(k));
        }
    }

    #[test]
    fn test_count_workdays_excludes_weekends() {
        // Mon 6th .. Sun 19th: two full weeks
        assert_eq!(count_workdays(d(2025, 1, 6), d(2025, 1, 19)), 10);
        // Fri .. Mon
        assert_eq!(count_workdays(d(2025, 1, 10), d(2025, 1, 13)), 2);
        // Sat .. Sun
        assert_eq!(count_workdays(d(2025, 1, 11), d(2025, 1, 12)), 0);
        // Sun .. Sat of the following week
        assert_eq!(count_workdays(d(2025, 1, 12), d(2025, 1, 25)), 10);
    }

    #[test]
    fn test_count_workdays_matches_day_stepping() {
        let start = d(2025, 1, 4);
        for offset in 0..7 {
            let from = d(2025, 1, 4 + offset);
            for len in 0..30 {
                let to = from + Days::new(len);
                let expected = from
                    .iter_days()
                    .take_while(|day| *day <= to)
                    .filter(|day| is_workday(*day))
                    .count() as i64;
                assert_eq!(count_workdays(from, to), expected, "{from}..{to}");
            }
        }
        assert_eq!(count_workdays(start, start), 0);
    }

    #[test]
    fn test_count_workdays_reversed_range() {
        assert_eq!(count_workdays(d(2025, 1, 10), d(2025, 1, 6)), 0);
    }

    #[test]
    fn test_finish_and_start_dates() {
        assert_eq!(finish_date(d(2025, 1, 6), 1), Ok(d(2025, 1, 6)));
        assert_eq!(finish_date(d(2025, 1, 6), 5), Ok(d(2025, 1, 10)));
        assert_eq!(finish_date(d(2025, 1, 8), 5), Ok(d(2025, 1, 14)));
        assert_eq!(finish_date(d(2025, 1, 8), 0), Ok(d(2025, 1, 8)));
        assert_eq!(start_date(d(2025, 1, 14), 5), Ok(d(2025, 1, 8)));
        assert_eq!(start_date(d(2025, 1, 14), 0), Ok(d(2025, 1, 14)));
    }

    #[test]
    fn test_add_then_subtract_from_workday() {
        let start = d(2025, 3, 5);
        for n in 0..30 {
            assert_eq!(sub(add(start, n), n), start);
        }
    }
}
