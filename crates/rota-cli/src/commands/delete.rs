use anyhow::Result;
use rota_core::repository::Repository;
use uuid::Uuid;

pub async fn delete_task(repo: &impl Repository, user: &str, task_id: Uuid) -> Result<()> {
    repo.delete_task(task_id, user).await?;
    println!("Deleted task {}", task_id);
    Ok(())
}
