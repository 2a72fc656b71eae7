use anyhow::Result;
use rota_core::models::CompletionResult;
use rota_core::repository::Repository;

use crate::cli::DoCommand;
use crate::util::resolve_task_id;

pub async fn do_task(repo: &impl Repository, user: &str, command: DoCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, user, &command.id).await?;
    let result = repo.complete_task(task_id, user).await?;

    match result {
        CompletionResult::Single(task) => {
            println!("Completed task: '{}'", task.title);
        }
        CompletionResult::Recurring { completed, next } => {
            println!("Completed task: '{}'", completed.title);
            if let Some(due_at) = next.due_at {
                println!(
                    "Created recurring task '{}' for {}",
                    next.title,
                    due_at.to_rfc2822()
                );
            } else {
                println!("Created recurring task '{}'", next.title);
            }
        }
    }

    Ok(())
}
