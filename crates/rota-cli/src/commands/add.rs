use anyhow::Result;
use owo_colors::{OwoColorize, Style};
use rota_core::models::NewTaskData;
use rota_core::repository::Repository;

use crate::cli::AddCommand;
use crate::parser::parse_due_date;
use crate::util::resolve_rule_id;

pub async fn add_task(repo: &impl Repository, user: &str, command: AddCommand) -> Result<()> {
    let due_at = command.due.as_deref().map(parse_due_date).transpose()?;
    let recurrence_rule_id = match &command.rule {
        Some(rule) => Some(resolve_rule_id(repo, rule).await?),
        None => None,
    };

    let new_task_data = NewTaskData {
        title: command.title,
        description: command.description,
        due_at,
        priority: command.priority,
        category_name: command.category,
        category_id: None,
        tags: command.tag,
        recurrence_rule_id,
    };

    let is_recurring = new_task_data.recurrence_rule_id.is_some();
    let added_task = repo.add_task(user, new_task_data).await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();

    if is_recurring {
        println!(
            "{} Created recurring task: {}",
            "✓".style(success_style),
            added_task.title.bold()
        );
    } else {
        println!(
            "{} Created task: {}",
            "✓".style(success_style),
            added_task.title.bold()
        );
    }
    println!(
        "  {} Task ID: {}",
        "→".style(info_style),
        added_task.id.to_string().yellow()
    );
    if let Some(due_at) = added_task.due_at {
        println!(
            "  {} Due: {}",
            "→".style(info_style),
            due_at.format("%Y-%m-%d %H:%M").to_string().cyan()
        );
    }

    Ok(())
}
