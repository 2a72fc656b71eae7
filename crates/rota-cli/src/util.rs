use anyhow::{anyhow, Result};
use rota_core::error::CoreError;
use rota_core::repository::Repository;
use uuid::Uuid;

pub async fn resolve_task_id(repo: &impl Repository, user: &str, short_id: &str) -> Result<Uuid> {
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let tasks = repo.find_tasks_by_short_id_prefix(user, short_id).await?;
    if tasks.len() == 1 {
        Ok(tasks[0].id)
    } else if tasks.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No task found with ID prefix '{}'",
            short_id
        ))))
    } else {
        let task_info: Vec<(String, String)> = tasks
            .into_iter()
            .map(|t| (t.id.to_string(), t.title))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(task_info)))
    }
}

/// Resolve a rule id prefix against all stored rules. Rules are shared
/// rather than per-user, so there is no user scope here.
pub async fn resolve_rule_id(repo: &impl Repository, short_id: &str) -> Result<Uuid> {
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let needle = short_id.replace('-', "").to_lowercase();
    let rules = repo.find_rules().await?;
    let matches: Vec<_> = rules
        .into_iter()
        .filter(|r| r.id.simple().to_string().starts_with(&needle))
        .collect();
    if matches.len() == 1 {
        Ok(matches[0].id)
    } else if matches.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No rule found with ID prefix '{}'",
            short_id
        ))))
    } else {
        let rule_info: Vec<(String, String)> = matches
            .into_iter()
            .map(|r| (r.id.to_string(), r.frequency.to_string()))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(rule_info)))
    }
}
