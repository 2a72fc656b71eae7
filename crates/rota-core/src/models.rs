use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// How often a recurrence rule fires.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Daily => write!(f, "DAILY"),
            Frequency::Weekly => write!(f, "WEEKLY"),
            Frequency::Monthly => write!(f, "MONTHLY"),
            Frequency::Yearly => write!(f, "YEARLY"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid frequency: {0}")]
pub struct ParseFrequencyError(String);

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            _ => Err(ParseFrequencyError(s.to_string())),
        }
    }
}

/// Two-letter weekday codes used in rule weekday sets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Weekday {
    #[serde(rename = "MO")]
    Mo,
    #[serde(rename = "TU")]
    Tu,
    #[serde(rename = "WE")]
    We,
    #[serde(rename = "TH")]
    Th,
    #[serde(rename = "FR")]
    Fr,
    #[serde(rename = "SA")]
    Sa,
    #[serde(rename = "SU")]
    Su,
}

impl Weekday {
    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            Weekday::Mo => chrono::Weekday::Mon,
            Weekday::Tu => chrono::Weekday::Tue,
            Weekday::We => chrono::Weekday::Wed,
            Weekday::Th => chrono::Weekday::Thu,
            Weekday::Fr => chrono::Weekday::Fri,
            Weekday::Sa => chrono::Weekday::Sat,
            Weekday::Su => chrono::Weekday::Sun,
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Weekday::Mo => "MO",
            Weekday::Tu => "TU",
            Weekday::We => "WE",
            Weekday::Th => "TH",
            Weekday::Fr => "FR",
            Weekday::Sa => "SA",
            Weekday::Su => "SU",
        };
        write!(f, "{}", code)
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid weekday code: {0}")]
pub struct ParseWeekdayError(String);

impl FromStr for Weekday {
    type Err = ParseWeekdayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MO" => Ok(Weekday::Mo),
            "TU" => Ok(Weekday::Tu),
            "WE" => Ok(Weekday::We),
            "TH" => Ok(Weekday::Th),
            "FR" => Ok(Weekday::Fr),
            "SA" => Ok(Weekday::Sa),
            "SU" => Ok(Weekday::Su),
            _ => Err(ParseWeekdayError(s.to_string())),
        }
    }
}

/// A stand-alone recurrence rule. Tasks reference a rule by id; many tasks
/// (the history of past occurrences) may point at the same rule.
///
/// `by_weekday` is meaningful for WEEKLY rules, `by_month_day` for MONTHLY
/// ones. Month days may be negative, counted from the end of the month
/// (-1 = last day). Both lists are stored as JSON arrays.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecurrenceRule {
    #[serde(with = "uuid::serde::compact")]
    pub id: Uuid,
    pub frequency: Frequency,
    /// Step count between occurrences; always >= 1.
    pub interval: i64,
    pub by_weekday: Json<Vec<Weekday>>,
    pub by_month_day: Json<Vec<i32>>,
    /// No occurrence may be generated strictly after this date.
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7(),
            frequency: Frequency::Daily,
            interval: 1,
            by_weekday: Json(Vec::new()),
            by_month_day: Json(Vec::new()),
            end_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

/// Data required to create a new recurrence rule.
#[derive(Debug, Clone)]
pub struct NewRuleData {
    pub frequency: Frequency,
    /// Defaults to 1 when absent.
    pub interval: Option<i64>,
    pub by_weekday: Vec<Weekday>,
    pub by_month_day: Vec<i32>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Partial update for a rule. Every field is tagged explicitly;
/// `end_date: Some(None)` clears the end date.
#[derive(Debug, Clone, Default)]
pub struct UpdateRuleData {
    pub frequency: Option<Frequency>,
    pub interval: Option<i64>,
    pub by_weekday: Option<Vec<Weekday>>,
    pub by_month_day: Option<Vec<i32>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task status: {0}")]
pub struct ParseTaskStatusError(String);

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "not_started" | "not-started" => Ok(TaskStatus::NotStarted),
            "in_progress" | "in-progress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            _ => Err(ParseTaskStatusError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum TaskPriority {
    None,
    Low,
    Medium,
    High,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task priority: {0}")]
pub struct ParseTaskPriorityError(String);

impl FromStr for TaskPriority {
    type Err = ParseTaskPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(TaskPriority::None),
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(ParseTaskPriorityError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_id: Option<Uuid>,
    /// A task with a rule id is recurring; completing it spawns a successor.
    pub recurrence_rule_id: Option<Uuid>,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: "local".to_string(),
            title: "".to_string(),
            description: None,
            status: TaskStatus::NotStarted,
            priority: TaskPriority::None,
            due_at: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            category_id: None,
            recurrence_rule_id: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Category {
    #[serde(with = "uuid::serde::compact")]
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTaskData {
    pub title: String,
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub category_name: Option<String>, // Kept for CLI convenience
    pub category_id: Option<Uuid>,     // Used internally for transactions
    pub tags: Vec<String>,
    pub recurrence_rule_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTaskData {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_at: Option<Option<DateTime<Utc>>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub category_name: Option<Option<String>>,
    pub recurrence_rule_id: Option<Option<Uuid>>,
    pub add_tags: Option<Vec<String>>,
    pub remove_tags: Option<Vec<String>>,
}

/// Outcome of completing a task.
#[derive(Debug)]
pub enum CompletionResult {
    Single(Task),
    Recurring { completed: Task, next: Task },
}

/// Represents a filter for listing tasks.
#[derive(Debug, Clone)]
pub enum Filter {
    Status(TaskStatus),
    Tag(String),
    Category(String),
    Priority(TaskPriority),
    DueDate(DueDate),
}

#[derive(Debug, Clone)]
pub enum DueDate {
    Today,
    Overdue,
    Before(DateTime<Utc>),
    After(DateTime<Utc>),
}
