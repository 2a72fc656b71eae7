use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    Category, CompletionResult, Filter, NewRuleData, NewTaskData, RecurrenceRule, Task,
    TaskPriority, TaskStatus, UpdateRuleData, UpdateTaskData,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export domain modules
pub mod categories;
pub mod rules;
pub mod tasks;

/// Task row joined with its category name and concatenated tags, as used by
/// list views.
#[derive(Debug, Clone, FromRow)]
pub struct TaskQueryResult {
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
    pub recurrence_rule_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub tags: Option<String>,
}

/// Domain-specific trait for task operations. All reads and writes are
/// scoped to the requesting user.
#[async_trait]
pub trait TaskRepository {
    async fn add_task(&self, user_id: &str, data: NewTaskData) -> Result<Task, CoreError>;
    async fn find_task_by_id(&self, id: Uuid, user_id: &str) -> Result<Option<Task>, CoreError>;
    async fn find_tasks_by_short_id_prefix(
        &self,
        user_id: &str,
        short_id: &str,
    ) -> Result<Vec<Task>, CoreError>;
    async fn find_tasks_with_details(
        &self,
        user_id: &str,
        filters: &[Filter],
    ) -> Result<Vec<TaskQueryResult>, CoreError>;
    async fn find_task_tags(&self, id: Uuid) -> Result<Vec<String>, CoreError>;
    async fn update_task(
        &self,
        id: Uuid,
        user_id: &str,
        data: UpdateTaskData,
    ) -> Result<Task, CoreError>;
    async fn delete_task(&self, id: Uuid, user_id: &str) -> Result<(), CoreError>;
    async fn complete_task(&self, id: Uuid, user_id: &str)
        -> Result<CompletionResult, CoreError>;
    async fn apply_recurrence(&self, id: Uuid, user_id: &str)
        -> Result<Option<Task>, CoreError>;
    /// Completed tasks carrying a rule, completed after `since`. Crosses
    /// user boundaries; used by the recurrence sweeper only.
    async fn find_completed_recurring_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Task>, CoreError>;
}

/// Domain-specific trait for recurrence-rule operations. Rules are
/// stand-alone resources referenced by tasks.
#[async_trait]
pub trait RuleRepository {
    async fn create_rule(&self, data: NewRuleData) -> Result<RecurrenceRule, CoreError>;
    async fn find_rule_by_id(&self, id: Uuid) -> Result<Option<RecurrenceRule>, CoreError>;
    async fn find_rules(&self) -> Result<Vec<RecurrenceRule>, CoreError>;
    async fn update_rule(&self, id: Uuid, data: UpdateRuleData)
        -> Result<RecurrenceRule, CoreError>;
    /// Rejected with [`CoreError::RuleInUse`] while any task references the
    /// rule.
    async fn delete_rule(&self, id: Uuid) -> Result<(), CoreError>;
    /// Store-backed occurrence preview: loads the rule, then walks the pure
    /// calculator. Fails with `NotFound` when the rule id does not resolve.
    async fn upcoming_occurrences(
        &self,
        rule_id: Uuid,
        from: DateTime<Utc>,
        count: usize,
    ) -> Result<Vec<DateTime<Utc>>, CoreError>;
}

/// Domain-specific trait for category operations
#[async_trait]
pub trait CategoryRepository {
    async fn add_category(&self, user_id: &str, name: String) -> Result<Category, CoreError>;
    async fn find_category_by_name(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<Option<Category>, CoreError>;
    async fn find_categories(&self, user_id: &str) -> Result<Vec<Category>, CoreError>;
    async fn delete_category(&self, user_id: &str, name: String) -> Result<(), CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository: TaskRepository + RuleRepository + CategoryRepository {
    // Individual domain operations are defined in their respective traits
}

/// SQLite implementation of the repository pattern. The pool is injected by
/// the caller; there is no ambient connection state.
pub struct SqliteRepository {
    pool: DbPool,
}

impl SqliteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying database pool
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl Repository for SqliteRepository {}
