use anyhow::Result;
use rota_core::repository::Repository;

use crate::cli::{CategoryCommand, CategorySubcommand};
use crate::views::table::display_categories;

pub async fn category_command(
    repo: &impl Repository,
    user: &str,
    command: CategoryCommand,
) -> Result<()> {
    match command.command {
        CategorySubcommand::Add(cmd) => {
            let category = repo.add_category(user, cmd.name).await?;
            println!("Created category: '{}'", category.name);
        }
        CategorySubcommand::List => {
            let categories = repo.find_categories(user).await?;
            display_categories(&categories);
        }
        CategorySubcommand::Delete(cmd) => {
            repo.delete_category(user, cmd.name.clone()).await?;
            println!("Deleted category: '{}'", cmd.name);
        }
    }
    Ok(())
}
