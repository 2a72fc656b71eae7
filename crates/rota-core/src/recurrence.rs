use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

use crate::error::CoreError;
use crate::models::{Frequency, RecurrenceRule};

/// Validates rule fields before they reach storage or the calculator.
///
/// The calculator itself assumes validated input and cannot fail; this is
/// the single gate where malformed rules are rejected.
pub fn validate_rule_fields(interval: i64, by_month_day: &[i32]) -> Result<(), CoreError> {
    if interval < 1 {
        return Err(CoreError::InvalidInput(format!(
            "Recurrence interval must be at least 1, got {}",
            interval
        )));
    }
    for &day in by_month_day {
        if day == 0 || !(-31..=31).contains(&day) {
            return Err(CoreError::InvalidInput(format!(
                "Month day must be in -31..=31 and non-zero, got {}",
                day
            )));
        }
    }
    Ok(())
}

/// Computes the next occurrence of a rule strictly after `current`.
///
/// Pure date arithmetic, no I/O. The time-of-day component of `current` is
/// preserved in the result. Stepping semantics by frequency:
///
/// - `DAILY`: `current + interval` days.
/// - `WEEKLY`: with a weekday set, the next matching weekday within the
///   following six days wins; otherwise (or when nothing matches, e.g. a
///   set containing only the current weekday) the date falls back to the
///   plain `7 * interval`-day step. The fallback is not re-validated
///   against the set.
/// - `MONTHLY`: with a month-day list, only the FIRST entry is honored.
///   The day is resolved in the current month when that still lies ahead,
///   otherwise in the month `interval` months later. Positive days clamp
///   to the last day of short months; negative days count backward from
///   the month end (-1 = last day).
/// - `YEARLY`: calendar year step; Feb 29 sources land on Feb 28 in
///   non-leap years.
pub fn next_occurrence(rule: &RecurrenceRule, current: DateTime<Utc>) -> DateTime<Utc> {
    match rule.frequency {
        Frequency::Daily => current + Duration::days(rule.interval),
        Frequency::Weekly => {
            if !rule.by_weekday.is_empty() {
                for offset in 1..=6 {
                    let candidate = current + Duration::days(offset);
                    let weekday = candidate.weekday();
                    if rule.by_weekday.iter().any(|w| w.to_chrono() == weekday) {
                        return candidate;
                    }
                }
            }
            current + Duration::days(7 * rule.interval)
        }
        Frequency::Monthly => {
            if let Some(&day) = rule.by_month_day.first() {
                let candidate = resolve_month_day(current, day);
                if candidate > current {
                    return candidate;
                }
                resolve_month_day(add_months(current, rule.interval), day)
            } else {
                add_months(current, rule.interval)
            }
        }
        Frequency::Yearly => add_months(current, 12 * rule.interval),
    }
}

/// A lazy, finite walk of future occurrences. Each walk starts fresh from
/// its seed date; no stream state is retained between walks.
pub struct Occurrences<'a> {
    rule: &'a RecurrenceRule,
    cursor: DateTime<Utc>,
    remaining: usize,
}

impl Iterator for Occurrences<'_> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<DateTime<Utc>> {
        if self.remaining == 0 {
            return None;
        }
        let next = next_occurrence(self.rule, self.cursor);
        if let Some(end) = self.rule.end_date {
            if next > end {
                self.remaining = 0;
                return None;
            }
        }
        self.cursor = next;
        self.remaining -= 1;
        Some(next)
    }
}

/// Returns up to `count` occurrences strictly after `from`, stopping early
/// once the rule's end date would be exceeded.
pub fn occurrences(rule: &RecurrenceRule, from: DateTime<Utc>, count: usize) -> Occurrences<'_> {
    Occurrences {
        rule,
        cursor: from,
        remaining: count,
    }
}

/// Eager convenience wrapper around [`occurrences`].
pub fn upcoming(rule: &RecurrenceRule, from: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
    occurrences(rule, from, count).collect()
}

/// Calendar month arithmetic. Day-of-month clamps to the target month's
/// length; dates past chrono's representable range saturate in place.
fn add_months(date: DateTime<Utc>, months: i64) -> DateTime<Utc> {
    date.checked_add_months(Months::new(months as u32))
        .unwrap_or(date)
}

/// Resolves a month-day value against `date`'s month, preserving the
/// time of day. Positive days clamp to `min(day, days_in_month)`; negative
/// days resolve as `days_in_month + day + 1`, never below day 1.
fn resolve_month_day(date: DateTime<Utc>, day: i32) -> DateTime<Utc> {
    let dim = days_in_month(date.year(), date.month()) as i32;
    let resolved = if day > 0 { day.min(dim) } else { dim + day + 1 };
    let resolved = resolved.max(1) as u32;
    date.with_day(resolved).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Weekday;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rstest::rstest;
    use sqlx::types::Json;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn rule(frequency: Frequency) -> RecurrenceRule {
        RecurrenceRule {
            frequency,
            ..Default::default()
        }
    }

    #[rstest]
    #[case(1, dt(2024, 3, 10, 9, 30), dt(2024, 3, 11, 9, 30))]
    #[case(3, dt(2024, 3, 10, 9, 30), dt(2024, 3, 13, 9, 30))]
    #[case(1, dt(2024, 2, 28, 23, 59), dt(2024, 2, 29, 23, 59))] // leap day
    #[case(1, dt(2023, 2, 28, 23, 59), dt(2023, 3, 1, 23, 59))]
    fn daily_steps_by_interval(
        #[case] interval: i64,
        #[case] from: DateTime<Utc>,
        #[case] expected: DateTime<Utc>,
    ) {
        let mut r = rule(Frequency::Daily);
        r.interval = interval;
        assert_eq!(next_occurrence(&r, from), expected);
    }

    proptest! {
        #[test]
        fn daily_always_adds_exactly_interval_days(
            offset in 0i64..20_000,
            interval in 1i64..400,
        ) {
            let from = dt(2000, 1, 1, 13, 45) + Duration::days(offset);
            let mut r = rule(Frequency::Daily);
            r.interval = interval;
            let next = next_occurrence(&r, from);
            prop_assert_eq!(next, from + Duration::days(interval));
            prop_assert_eq!(next.time(), from.time());
        }
    }

    #[test]
    fn weekly_without_weekday_set_steps_whole_weeks() {
        let mut r = rule(Frequency::Weekly);
        r.interval = 2;
        assert_eq!(
            next_occurrence(&r, dt(2024, 1, 1, 8, 0)),
            dt(2024, 1, 15, 8, 0)
        );
    }

    #[test]
    fn weekly_walks_mo_we_fr_within_one_calendar_week() {
        let mut r = rule(Frequency::Weekly);
        r.by_weekday = Json(vec![Weekday::Mo, Weekday::We, Weekday::Fr]);

        // 2024-01-07 is a Sunday; the following Mon/Wed/Fri share a week.
        let got = upcoming(&r, dt(2024, 1, 7, 9, 0), 3);
        assert_eq!(
            got,
            vec![dt(2024, 1, 8, 9, 0), dt(2024, 1, 10, 9, 0), dt(2024, 1, 12, 9, 0)]
        );
    }

    #[test]
    fn weekly_from_a_matching_day_moves_to_the_next_set_member() {
        let mut r = rule(Frequency::Weekly);
        r.by_weekday = Json(vec![Weekday::Mo, Weekday::We, Weekday::Fr]);

        // Seeded on Monday 2024-01-08 the walk continues Wed, Fri, next Mon.
        let got = upcoming(&r, dt(2024, 1, 8, 9, 0), 3);
        assert_eq!(
            got,
            vec![dt(2024, 1, 10, 9, 0), dt(2024, 1, 12, 9, 0), dt(2024, 1, 15, 9, 0)]
        );
    }

    #[test]
    fn weekly_single_weekday_falls_back_to_the_plain_step() {
        let mut r = rule(Frequency::Weekly);
        r.by_weekday = Json(vec![Weekday::Mo]);

        // From a Monday the six-day search finds no other Monday, so the
        // interval step produces the Monday one week out.
        assert_eq!(
            next_occurrence(&r, dt(2024, 1, 8, 9, 0)),
            dt(2024, 1, 15, 9, 0)
        );
    }

    #[test]
    fn monthly_mid_month_day_sequence() {
        let mut r = rule(Frequency::Monthly);
        r.by_month_day = Json(vec![15]);

        let got = upcoming(&r, dt(2024, 1, 1, 12, 0), 3);
        assert_eq!(
            got,
            vec![dt(2024, 1, 15, 12, 0), dt(2024, 2, 15, 12, 0), dt(2024, 3, 15, 12, 0)]
        );
    }

    #[test]
    fn monthly_last_day_tracks_month_length() {
        let mut r = rule(Frequency::Monthly);
        r.by_month_day = Json(vec![-1]);

        let got = upcoming(&r, dt(2024, 1, 15, 18, 0), 2);
        assert_eq!(got, vec![dt(2024, 1, 31, 18, 0), dt(2024, 2, 29, 18, 0)]);

        // Same walk in a non-leap year ends on Feb 28.
        let got = upcoming(&r, dt(2023, 1, 15, 18, 0), 2);
        assert_eq!(got, vec![dt(2023, 1, 31, 18, 0), dt(2023, 2, 28, 18, 0)]);
    }

    #[rstest]
    #[case(31, dt(2024, 1, 31, 7, 0), dt(2024, 2, 29, 7, 0))] // clamp to Feb 29
    #[case(31, dt(2023, 1, 31, 7, 0), dt(2023, 2, 28, 7, 0))] // clamp to Feb 28
    #[case(-2, dt(2024, 3, 31, 7, 0), dt(2024, 4, 29, 7, 0))] // second-to-last
    fn monthly_day_clamps_never_overflow(
        #[case] day: i32,
        #[case] from: DateTime<Utc>,
        #[case] expected: DateTime<Utc>,
    ) {
        let mut r = rule(Frequency::Monthly);
        r.by_month_day = Json(vec![day]);
        assert_eq!(next_occurrence(&r, from), expected);
    }

    #[test]
    fn monthly_only_first_month_day_entry_is_honored() {
        let mut r = rule(Frequency::Monthly);
        r.by_month_day = Json(vec![15, 20, 25]);

        let got = upcoming(&r, dt(2024, 1, 1, 12, 0), 2);
        assert_eq!(got, vec![dt(2024, 1, 15, 12, 0), dt(2024, 2, 15, 12, 0)]);
    }

    #[test]
    fn monthly_without_day_list_steps_calendar_months() {
        let mut r = rule(Frequency::Monthly);
        r.interval = 2;
        assert_eq!(
            next_occurrence(&r, dt(2024, 1, 31, 10, 0)),
            dt(2024, 3, 31, 10, 0)
        );
        // Jan 31 + 1 month clamps to Feb 29.
        r.interval = 1;
        assert_eq!(
            next_occurrence(&r, dt(2024, 1, 31, 10, 0)),
            dt(2024, 2, 29, 10, 0)
        );
    }

    #[rstest]
    #[case(dt(2023, 2, 28, 6, 0), dt(2024, 2, 28, 6, 0))]
    #[case(dt(2024, 2, 29, 6, 0), dt(2025, 2, 28, 6, 0))] // leap day rolls over
    fn yearly_preserves_month_and_day(
        #[case] from: DateTime<Utc>,
        #[case] expected: DateTime<Utc>,
    ) {
        let r = rule(Frequency::Yearly);
        assert_eq!(next_occurrence(&r, from), expected);
    }

    #[test]
    fn end_date_truncates_the_walk() {
        let mut r = rule(Frequency::Daily);
        r.end_date = Some(dt(2024, 1, 5, 0, 0));

        let got = upcoming(&r, dt(2024, 1, 1, 0, 0), 10);
        assert_eq!(got.len(), 4);
        assert_eq!(*got.last().unwrap(), dt(2024, 1, 5, 0, 0));
        assert!(got.iter().all(|d| *d <= r.end_date.unwrap()));
    }

    #[test]
    fn end_date_already_passed_yields_empty_walk() {
        let mut r = rule(Frequency::Daily);
        r.end_date = Some(dt(2023, 12, 31, 0, 0));

        assert!(upcoming(&r, dt(2024, 1, 1, 0, 0), 5).is_empty());
    }

    #[test]
    fn walks_are_deterministic_and_stateless() {
        let mut r = rule(Frequency::Weekly);
        r.by_weekday = Json(vec![Weekday::Tu, Weekday::Th]);

        let from = dt(2024, 5, 1, 16, 0);
        assert_eq!(upcoming(&r, from, 5), upcoming(&r, from, 5));
    }

    #[rstest]
    #[case(0, &[])]
    #[case(-3, &[])]
    #[case(1, &[0])]
    #[case(1, &[32])]
    #[case(1, &[-32])]
    fn validation_rejects_bad_fields(#[case] interval: i64, #[case] month_days: &[i32]) {
        assert!(matches!(
            validate_rule_fields(interval, month_days),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn validation_accepts_the_supported_contract() {
        assert!(validate_rule_fields(1, &[]).is_ok());
        assert!(validate_rule_fields(4, &[15, -1, 31, -31]).is_ok());
    }

    #[rstest]
    #[case(2024, 2, 29)]
    #[case(2023, 2, 28)]
    #[case(2024, 12, 31)]
    #[case(2024, 4, 30)]
    fn days_in_month_handles_leap_years_and_year_end(
        #[case] year: i32,
        #[case] month: u32,
        #[case] expected: u32,
    ) {
        assert_eq!(days_in_month(year, month), expected);
    }
}
