use crate::error::CoreError;
use crate::models::{NewRuleData, RecurrenceRule, UpdateRuleData};
use crate::recurrence;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

#[async_trait]
impl super::RuleRepository for SqliteRepository {
    async fn create_rule(&self, data: NewRuleData) -> Result<RecurrenceRule, CoreError> {
        let interval = data.interval.unwrap_or(1);
        recurrence::validate_rule_fields(interval, &data.by_month_day)?;

        let rule = RecurrenceRule {
            id: Uuid::now_v7(),
            frequency: data.frequency,
            interval,
            by_weekday: Json(data.by_weekday),
            by_month_day: Json(data.by_month_day),
            end_date: data.end_date,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO recurrence_rules (id, frequency, interval, by_weekday, by_month_day, end_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(rule.id)
        .bind(rule.frequency)
        .bind(rule.interval)
        .bind(&rule.by_weekday)
        .bind(&rule.by_month_day)
        .bind(rule.end_date)
        .bind(rule.created_at)
        .bind(rule.updated_at)
        .execute(self.pool())
        .await?;

        Ok(rule)
    }

    async fn find_rule_by_id(&self, id: Uuid) -> Result<Option<RecurrenceRule>, CoreError> {
        let rule = sqlx::query_as("SELECT * FROM recurrence_rules WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(rule)
    }

    async fn find_rules(&self) -> Result<Vec<RecurrenceRule>, CoreError> {
        let rules = sqlx::query_as("SELECT * FROM recurrence_rules ORDER BY created_at")
            .fetch_all(self.pool())
            .await?;
        Ok(rules)
    }

    async fn update_rule(
        &self,
        id: Uuid,
        data: UpdateRuleData,
    ) -> Result<RecurrenceRule, CoreError> {
        recurrence::validate_rule_fields(
            data.interval.unwrap_or(1),
            data.by_month_day.as_deref().unwrap_or(&[]),
        )?;

        let mut tx = self.pool().begin().await?;

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE recurrence_rules SET ");
        let mut updated = false;

        if let Some(frequency) = data.frequency {
            qb.push("frequency = ");
            qb.push_bind(frequency);
            updated = true;
        }

        if let Some(interval) = data.interval {
            if updated {
                qb.push(", ");
            }
            qb.push("interval = ");
            qb.push_bind(interval);
            updated = true;
        }

        if let Some(by_weekday) = data.by_weekday {
            if updated {
                qb.push(", ");
            }
            qb.push("by_weekday = ");
            qb.push_bind(Json(by_weekday));
            updated = true;
        }

        if let Some(by_month_day) = data.by_month_day {
            if updated {
                qb.push(", ");
            }
            qb.push("by_month_day = ");
            qb.push_bind(Json(by_month_day));
            updated = true;
        }

        if let Some(end_date) = data.end_date {
            if updated {
                qb.push(", ");
            }
            qb.push("end_date = ");
            qb.push_bind(end_date);
            updated = true;
        }

        if updated {
            qb.push(", updated_at = ");
            qb.push_bind(Utc::now());
            qb.push(" WHERE id = ");
            qb.push_bind(id);
            qb.build().execute(&mut *tx).await?;
        }

        let rule: RecurrenceRule = sqlx::query_as("SELECT * FROM recurrence_rules WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Recurrence rule {}", id)))?;

        tx.commit().await?;
        Ok(rule)
    }

    async fn delete_rule(&self, id: Uuid) -> Result<(), CoreError> {
        // SQLite does not enforce the foreign key here by default, so the
        // referential guard is an explicit count.
        let referencing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE recurrence_rule_id = $1")
                .bind(id)
                .fetch_one(self.pool())
                .await?;

        if referencing > 0 {
            return Err(CoreError::RuleInUse(format!(
                "{} task(s) still reference rule {}",
                referencing, id
            )));
        }

        let result = sqlx::query("DELETE FROM recurrence_rules WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Recurrence rule {}", id)));
        }
        Ok(())
    }

    async fn upcoming_occurrences(
        &self,
        rule_id: Uuid,
        from: DateTime<Utc>,
        count: usize,
    ) -> Result<Vec<DateTime<Utc>>, CoreError> {
        let rule = self
            .find_rule_by_id(rule_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Recurrence rule {}", rule_id)))?;
        Ok(recurrence::upcoming(&rule, from, count))
    }
}
