use clap::Parser;
use dialoguer::Confirm;
use owo_colors::{OwoColorize, Style};
use rota_core::db;
use rota_core::error::CoreError;
use rota_core::repository::{SqliteRepository, TaskRepository};
use tracing_subscriber::EnvFilter;
use util::resolve_task_id;

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("ROTA_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = config::Config::load().unwrap_or_else(|e| {
        eprintln!("{} invalid configuration: {}", "Warning:".yellow().bold(), e);
        config::Config::default()
    });

    let db_pool = match db::establish_connection(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    let repository = SqliteRepository::new(db_pool);

    let cli = cli::Cli::parse();
    let user = cli.user.as_deref().unwrap_or(&config.user);

    let result = match cli.command {
        cli::Commands::Add(command) => commands::add::add_task(&repository, user, command).await,
        cli::Commands::List(command) => {
            commands::list::list_tasks(&repository, user, command).await
        }
        cli::Commands::Delete(command) => {
            let task_id = match resolve_task_id(&repository, user, &command.id).await {
                Ok(id) => id,
                Err(e) => {
                    handle_error(e);
                    std::process::exit(1);
                }
            };
            let task = match repository.find_task_by_id(task_id, user).await {
                Ok(Some(t)) => t,
                Ok(None) => {
                    eprintln!(
                        "{} Task with ID '{}' not found.",
                        "Error:".red().bold(),
                        task_id
                    );
                    std::process::exit(1);
                }
                Err(e) => {
                    handle_error(e.into());
                    std::process::exit(1);
                }
            };

            if !command.force {
                let confirmation = Confirm::new()
                    .with_prompt(format!(
                        "Are you sure you want to delete task '{}'?",
                        task.title
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or(false);

                if !confirmation {
                    println!("Deletion cancelled.");
                    return;
                }
            }
            commands::delete::delete_task(&repository, user, task_id).await
        }
        cli::Commands::Do(command) => commands::r#do::do_task(&repository, user, command).await,
        cli::Commands::Edit(command) => commands::edit::edit_task(&repository, user, command).await,
        cli::Commands::Category(command) => {
            commands::category::category_command(&repository, user, command).await
        }
        cli::Commands::Rule(command) => commands::rule::rule_command(&repository, command).await,
        cli::Commands::Sweep(command) => {
            commands::sweep::sweep(repository, config.sweep, command).await
        }
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::RuleInUse(s) => {
                eprintln!(
                    "{} {}",
                    "Error:".style(error_style),
                    format!("Rule is still in use: {}", s).yellow()
                );
            }
            CoreError::AmbiguousId(items) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, label) in items {
                    eprintln!("  {} ({})", id.yellow(), label);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {}", "Error:".style(error_style), err);
    }
}
