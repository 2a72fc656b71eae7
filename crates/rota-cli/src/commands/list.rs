use anyhow::Result;
use rota_core::models::{DueDate, Filter};
use rota_core::repository::Repository;

use crate::cli::ListCommand;
use crate::parser::parse_due_date;
use crate::views::table::{display_tasks, ViewTask};

pub async fn list_tasks(repo: &impl Repository, user: &str, command: ListCommand) -> Result<()> {
    let mut filters = Vec::new();
    if let Some(status) = command.status {
        filters.push(Filter::Status(status));
    }
    if let Some(tag) = command.tag {
        filters.push(Filter::Tag(tag));
    }
    if let Some(category) = command.category {
        filters.push(Filter::Category(category));
    }
    if let Some(priority) = command.priority {
        filters.push(Filter::Priority(priority));
    }
    if let Some(due) = command.due.as_deref() {
        filters.push(Filter::DueDate(parse_due_filter(due)?));
    }

    let tasks = repo.find_tasks_with_details(user, &filters).await?;

    let view_tasks: Vec<ViewTask> = tasks
        .into_iter()
        .map(|t| {
            let mut tags: Vec<String> = t
                .tags
                .map_or_else(Vec::new, |s| s.split(',').map(String::from).collect());
            tags.sort();
            tags.dedup();
            ViewTask {
                id: t.id,
                title: t.title,
                status: t.status,
                priority: t.priority,
                due_at: t.due_at,
                category_name: t.category_name,
                tags,
                recurring: t.recurrence_rule_id.is_some(),
            }
        })
        .collect();

    display_tasks(&view_tasks);

    Ok(())
}

fn parse_due_filter(input: &str) -> Result<DueDate> {
    match input {
        "today" => Ok(DueDate::Today),
        "overdue" => Ok(DueDate::Overdue),
        other => {
            if let Some(date) = other.strip_prefix("before:") {
                Ok(DueDate::Before(parse_due_date(date)?))
            } else if let Some(date) = other.strip_prefix("after:") {
                Ok(DueDate::After(parse_due_date(date)?))
            } else {
                Err(anyhow::anyhow!(
                    "Invalid due filter '{}'. Use 'today', 'overdue', 'before:<date>' or 'after:<date>'",
                    input
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_due_filters() {
        assert!(matches!(parse_due_filter("today"), Ok(DueDate::Today)));
        assert!(matches!(parse_due_filter("overdue"), Ok(DueDate::Overdue)));
        assert!(matches!(
            parse_due_filter("before:2026-12-31"),
            Ok(DueDate::Before(_))
        ));
        assert!(parse_due_filter("sometime").is_err());
    }
}
