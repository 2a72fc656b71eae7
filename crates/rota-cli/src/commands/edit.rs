use anyhow::Result;
use rota_core::models::UpdateTaskData;
use rota_core::repository::Repository;

use crate::cli::EditCommand;
use crate::parser::parse_due_date;
use crate::util::{resolve_rule_id, resolve_task_id};

pub async fn edit_task(repo: &impl Repository, user: &str, command: EditCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, user, &command.id).await?;

    let description = if command.description_clear {
        Some(None)
    } else {
        command.description.map(Some)
    };

    let due_at = if command.due_clear {
        Some(None)
    } else {
        command
            .due
            .as_deref()
            .map(parse_due_date)
            .transpose()?
            .map(Some)
    };

    let category_name = if command.category_clear {
        Some(None)
    } else {
        command.category.map(Some)
    };

    let recurrence_rule_id = if command.rule_clear {
        Some(None)
    } else {
        match &command.rule {
            Some(rule) => Some(Some(resolve_rule_id(repo, rule).await?)),
            None => None,
        }
    };

    let update_data = UpdateTaskData {
        title: command.title,
        description,
        due_at,
        priority: command.priority,
        status: command.status,
        category_name,
        recurrence_rule_id,
        add_tags: if command.add_tag.is_empty() {
            None
        } else {
            Some(command.add_tag)
        },
        remove_tags: if command.remove_tag.is_empty() {
            None
        } else {
            Some(command.remove_tag)
        },
    };

    let updated = repo.update_task(task_id, user, update_data).await?;
    println!("Updated task: '{}'", updated.title);

    Ok(())
}
