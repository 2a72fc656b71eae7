use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_english::{parse_date_string, Dialect};
use rota_core::models::Weekday;

pub fn parse_due_date(date_str: &str) -> Result<DateTime<Utc>> {
    parse_date_string(date_str, Utc::now(), Dialect::Us)
        .map_err(|e| anyhow::anyhow!("Failed to parse date '{}': {}", date_str, e))
}

/// Parse a weekday list like 'MO,WE,FR'. An empty string is an empty list.
pub fn parse_weekdays(input: &str) -> Result<Vec<Weekday>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Weekday>().map_err(Into::into))
        .collect()
}

/// Parse a month-day list like '15,-1'. An empty string is an empty list.
pub fn parse_month_days(input: &str) -> Result<Vec<i32>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>()
                .map_err(|_| anyhow::anyhow!("Invalid month day: '{}'", s))
        })
        .collect()
}
