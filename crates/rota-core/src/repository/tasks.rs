use crate::error::CoreError;
use crate::models::{
    Category, CompletionResult, DueDate, Filter, NewTaskData, RecurrenceRule, Task, TaskPriority,
    TaskStatus, UpdateTaskData,
};
use crate::recurrence;
use crate::repository::{SqliteRepository, TaskQueryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, Transaction};
use uuid::Uuid;

#[async_trait]
impl super::TaskRepository for SqliteRepository {
    async fn add_task(&self, user_id: &str, data: NewTaskData) -> Result<Task, CoreError> {
        let mut tx = self.pool().begin().await?;
        let task = Self::add_task_in_transaction(&mut tx, user_id, data).await?;
        tx.commit().await?;
        Ok(task)
    }

    async fn find_task_by_id(&self, id: Uuid, user_id: &str) -> Result<Option<Task>, CoreError> {
        let task = sqlx::query_as("SELECT * FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(task)
    }

    async fn find_tasks_by_short_id_prefix(
        &self,
        user_id: &str,
        short_id: &str,
    ) -> Result<Vec<Task>, CoreError> {
        let tasks: Vec<Task> =
            sqlx::query_as("SELECT * FROM tasks WHERE user_id = $1 AND hex(id) LIKE $2")
                .bind(user_id)
                .bind(format!("{}%", short_id.replace('-', "").to_uppercase()))
                .fetch_all(self.pool())
                .await?;
        Ok(tasks)
    }

    async fn find_tasks_with_details(
        &self,
        user_id: &str,
        filters: &[Filter],
    ) -> Result<Vec<TaskQueryResult>, CoreError> {
        let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"SELECT
                t.id, t.user_id, t.title, t.description, t.status, t.priority,
                t.due_at, t.completed_at, t.created_at, t.updated_at,
                t.category_id, t.recurrence_rule_id,
                c.name as category_name,
                GROUP_CONCAT(tt.tag_name) as tags
            FROM tasks t
            LEFT JOIN categories c ON t.category_id = c.id
            LEFT JOIN task_tags tt ON t.id = tt.task_id
            WHERE t.user_id = "#,
        );
        query_builder.push_bind(user_id);

        for filter in filters {
            query_builder.push(" AND ");
            match filter {
                Filter::Status(status) => {
                    query_builder.push("t.status = ");
                    query_builder.push_bind(status.clone());
                }
                Filter::Tag(tag) => {
                    query_builder
                        .push("t.id IN (SELECT task_id FROM task_tags WHERE tag_name = ");
                    query_builder.push_bind(tag);
                    query_builder.push(")");
                }
                Filter::Category(category) => {
                    query_builder.push("c.name = ");
                    query_builder.push_bind(category);
                }
                Filter::Priority(priority) => {
                    query_builder.push("t.priority = ");
                    query_builder.push_bind(priority.clone());
                }
                Filter::DueDate(due_date) => match due_date {
                    DueDate::Today => {
                        query_builder.push("date(t.due_at) = date('now')");
                    }
                    DueDate::Overdue => {
                        query_builder
                            .push("date(t.due_at) < date('now') AND t.status != 'completed'");
                    }
                    DueDate::Before(date) => {
                        query_builder.push("t.due_at < ");
                        query_builder.push_bind(date);
                    }
                    DueDate::After(date) => {
                        query_builder.push("t.due_at > ");
                        query_builder.push_bind(date);
                    }
                },
            }
        }

        query_builder.push(
            r#" GROUP BY t.id, t.user_id, t.title, t.description, t.status, t.priority,
            t.due_at, t.completed_at, t.created_at, t.updated_at,
            t.category_id, t.recurrence_rule_id, c.name
            ORDER BY t.due_at IS NULL, t.due_at, t.created_at"#,
        );

        let tasks = query_builder.build_query_as().fetch_all(self.pool()).await?;
        Ok(tasks)
    }

    async fn find_task_tags(&self, id: Uuid) -> Result<Vec<String>, CoreError> {
        let tags =
            sqlx::query_scalar("SELECT tag_name FROM task_tags WHERE task_id = $1 ORDER BY tag_name")
                .bind(id)
                .fetch_all(self.pool())
                .await?;
        Ok(tags)
    }

    async fn update_task(
        &self,
        id: Uuid,
        user_id: &str,
        data: UpdateTaskData,
    ) -> Result<Task, CoreError> {
        let mut tx = self.pool().begin().await?;

        // Existence check up front so a bad id is NotFound, not a silent
        // zero-row update.
        let _current: Task = sqlx::query_as("SELECT * FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Task {}", id)))?;

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE tasks SET ");
        let mut updated = false;

        if let Some(title) = &data.title {
            qb.push("title = ");
            qb.push_bind(title);
            updated = true;
        }

        if let Some(description) = &data.description {
            if updated {
                qb.push(", ");
            }
            qb.push("description = ");
            qb.push_bind(description);
            updated = true;
        }

        if let Some(due_at) = &data.due_at {
            if updated {
                qb.push(", ");
            }
            qb.push("due_at = ");
            qb.push_bind(due_at);
            updated = true;
        }

        if let Some(priority) = &data.priority {
            if updated {
                qb.push(", ");
            }
            qb.push("priority = ");
            qb.push_bind(priority);
            updated = true;
        }

        if let Some(status) = &data.status {
            if updated {
                qb.push(", ");
            }
            qb.push("status = ");
            qb.push_bind(status);
            updated = true;
        }

        if let Some(rule_option) = &data.recurrence_rule_id {
            if let Some(rule_id) = rule_option {
                Self::find_rule_in_transaction(&mut tx, *rule_id).await?;
            }
            if updated {
                qb.push(", ");
            }
            qb.push("recurrence_rule_id = ");
            qb.push_bind(rule_option);
            updated = true;
        }

        if let Some(category_name_option) = &data.category_name {
            let category_id = match category_name_option {
                Some(category_name) => {
                    let category: Option<Category> = sqlx::query_as(
                        "SELECT * FROM categories WHERE user_id = $1 AND name = $2",
                    )
                    .bind(user_id)
                    .bind(category_name)
                    .fetch_optional(&mut *tx)
                    .await?;
                    Some(
                        category
                            .map(|c| c.id)
                            .ok_or_else(|| CoreError::NotFound(category_name.clone()))?,
                    )
                }
                None => None,
            };
            if updated {
                qb.push(", ");
            }
            qb.push("category_id = ");
            qb.push_bind(category_id);
            updated = true;
        }

        if let Some(tags_to_add) = &data.add_tags {
            if !tags_to_add.is_empty() {
                let mut query_builder: QueryBuilder<Sqlite> =
                    QueryBuilder::new("INSERT OR IGNORE INTO task_tags (task_id, tag_name) ");
                query_builder.push_values(tags_to_add.iter(), |mut b, tag| {
                    b.push_bind(id).push_bind(tag);
                });
                query_builder.build().execute(&mut *tx).await?;
            }
        }

        if let Some(tags_to_remove) = &data.remove_tags {
            if !tags_to_remove.is_empty() {
                let mut query_builder: QueryBuilder<Sqlite> =
                    QueryBuilder::new("DELETE FROM task_tags WHERE task_id = ");
                query_builder.push_bind(id);
                query_builder.push(" AND tag_name IN (");
                let mut separated = query_builder.separated(", ");
                for tag in tags_to_remove.iter() {
                    separated.push_bind(tag);
                }
                separated.push_unseparated(")");
                query_builder.build().execute(&mut *tx).await?;
            }
        }

        if updated {
            qb.push(", updated_at = ");
            qb.push_bind(Utc::now());
            qb.push(" WHERE id = ");
            qb.push_bind(id);
            qb.build().execute(&mut *tx).await?;
        }

        let updated_task: Task = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated_task)
    }

    async fn delete_task(&self, id: Uuid, user_id: &str) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Task {}", id)));
        }
        Ok(())
    }

    async fn complete_task(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<CompletionResult, CoreError> {
        let mut tx = self.pool().begin().await?;

        let completed_task: Task = sqlx::query_as(
            r#"UPDATE tasks
            SET status = $1, completed_at = $2, updated_at = $2
            WHERE id = $3 AND user_id = $4
            RETURNING *
            "#,
        )
        .bind(TaskStatus::Completed)
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Task {}", id)))?;

        // The synchronous trigger: spawn the successor in the same
        // transaction as the completion itself.
        let next = Self::spawn_successor_in_transaction(&mut tx, &completed_task).await?;

        tx.commit().await?;

        match next {
            Some(next) => Ok(CompletionResult::Recurring {
                completed: completed_task,
                next,
            }),
            None => Ok(CompletionResult::Single(completed_task)),
        }
    }

    async fn apply_recurrence(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<Task>, CoreError> {
        let mut tx = self.pool().begin().await?;

        let task: Option<Task> = sqlx::query_as("SELECT * FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        // A missing task or a task without a rule is a legitimate no-op.
        let Some(task) = task else {
            return Ok(None);
        };

        let next = Self::spawn_successor_in_transaction(&mut tx, &task).await?;
        tx.commit().await?;
        Ok(next)
    }

    async fn find_completed_recurring_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Task>, CoreError> {
        let tasks = sqlx::query_as(
            r#"SELECT * FROM tasks
            WHERE status = 'completed'
              AND completed_at > $1
              AND recurrence_rule_id IS NOT NULL
            ORDER BY completed_at"#,
        )
        .bind(since)
        .fetch_all(self.pool())
        .await?;
        Ok(tasks)
    }
}

impl SqliteRepository {
    /// Add a task within an existing transaction
    pub(crate) async fn add_task_in_transaction(
        tx: &mut Transaction<'_, Sqlite>,
        user_id: &str,
        mut data: NewTaskData,
    ) -> Result<Task, CoreError> {
        if data.category_id.is_none() {
            if let Some(category_name) = &data.category_name {
                let category: Option<Category> =
                    sqlx::query_as("SELECT * FROM categories WHERE user_id = $1 AND name = $2")
                        .bind(user_id)
                        .bind(category_name)
                        .fetch_optional(&mut **tx)
                        .await?;
                data.category_id = Some(
                    category
                        .map(|c| c.id)
                        .ok_or_else(|| CoreError::NotFound(category_name.clone()))?,
                );
            }
        }

        // SQLite leaves foreign keys unenforced by default; resolve the rule
        // explicitly so a dangling reference is rejected up front.
        if let Some(rule_id) = data.recurrence_rule_id {
            Self::find_rule_in_transaction(tx, rule_id).await?;
        }

        let task = Task {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            title: data.title,
            description: data.description,
            status: TaskStatus::NotStarted,
            priority: data.priority.unwrap_or(TaskPriority::None),
            due_at: data.due_at,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            category_id: data.category_id,
            recurrence_rule_id: data.recurrence_rule_id,
        };

        sqlx::query(
            r#"INSERT INTO tasks (id, user_id, title, description, status, priority, due_at, created_at, updated_at, category_id, recurrence_rule_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(task.id)
        .bind(&task.user_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.status)
        .bind(&task.priority)
        .bind(task.due_at)
        .bind(task.created_at)
        .bind(task.updated_at)
        .bind(task.category_id)
        .bind(task.recurrence_rule_id)
        .execute(&mut **tx)
        .await?;

        let tags = data.tags;
        if !tags.is_empty() {
            let mut query_builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT INTO task_tags (task_id, tag_name) ");
            query_builder.push_values(tags.iter(), |mut b, tag| {
                b.push_bind(task.id).push_bind(tag);
            });
            query_builder.build().execute(&mut **tx).await?;
        }

        Ok(task)
    }

    /// The Recurrence Applier: given a completed (or completing) recurring
    /// task, create its successor dated at the next occurrence, copying
    /// category, priority and tags. Tasks without a rule, and rules whose
    /// end date has passed, yield `None`.
    ///
    /// No dedup marker is kept: callers invoking this twice for the same
    /// completion create two successors. Redundant invocation is otherwise
    /// safe.
    pub(crate) async fn spawn_successor_in_transaction(
        tx: &mut Transaction<'_, Sqlite>,
        task: &Task,
    ) -> Result<Option<Task>, CoreError> {
        let Some(rule_id) = task.recurrence_rule_id else {
            return Ok(None);
        };

        let rule = Self::find_rule_in_transaction(tx, rule_id).await?;

        let reference = task.due_at.unwrap_or(task.created_at);
        let Some(next_due) = recurrence::occurrences(&rule, reference, 1).next() else {
            return Ok(None);
        };

        let successor = Task {
            id: Uuid::now_v7(),
            user_id: task.user_id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            status: TaskStatus::NotStarted,
            priority: task.priority.clone(),
            due_at: Some(next_due),
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            category_id: task.category_id,
            recurrence_rule_id: Some(rule_id),
        };

        sqlx::query(
            r#"INSERT INTO tasks (id, user_id, title, description, status, priority, due_at, created_at, updated_at, category_id, recurrence_rule_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(successor.id)
        .bind(&successor.user_id)
        .bind(&successor.title)
        .bind(&successor.description)
        .bind(&successor.status)
        .bind(&successor.priority)
        .bind(successor.due_at)
        .bind(successor.created_at)
        .bind(successor.updated_at)
        .bind(successor.category_id)
        .bind(successor.recurrence_rule_id)
        .execute(&mut **tx)
        .await?;

        // Duplicate the tag join rows onto the successor.
        sqlx::query(
            r#"INSERT INTO task_tags (task_id, tag_name)
            SELECT $1, tag_name FROM task_tags WHERE task_id = $2"#,
        )
        .bind(successor.id)
        .bind(task.id)
        .execute(&mut **tx)
        .await?;

        Ok(Some(successor))
    }

    async fn find_rule_in_transaction(
        tx: &mut Transaction<'_, Sqlite>,
        rule_id: Uuid,
    ) -> Result<RecurrenceRule, CoreError> {
        sqlx::query_as("SELECT * FROM recurrence_rules WHERE id = $1")
            .bind(rule_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Recurrence rule {}", rule_id)))
    }
}
