//! # Rota Core Library
//!
//! Task management with rule-based recurrence. Tasks may reference a
//! recurrence rule; completing such a task spawns its successor at the
//! next computed occurrence, inside the same transaction.
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`repository`]: Data access layer with Repository pattern
//! - [`recurrence`]: The occurrence calculator
//! - [`scheduler`]: Background sweep for missed recurrence spawns
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rota_core::{
//!     db,
//!     models::{Frequency, NewRuleData, NewTaskData},
//!     repository::{RuleRepository, SqliteRepository, TaskRepository},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rota_core::error::CoreError> {
//!     let pool = db::establish_connection("tasks.db").await?;
//!     let repo = SqliteRepository::new(pool);
//!
//!     let rule = repo
//!         .create_rule(NewRuleData {
//!             frequency: Frequency::Daily,
//!             interval: None,
//!             by_weekday: vec![],
//!             by_month_day: vec![],
//!             end_date: None,
//!         })
//!         .await?;
//!
//!     let task = repo
//!         .add_task(
//!             "local",
//!             NewTaskData {
//!                 title: "Daily standup".to_string(),
//!                 recurrence_rule_id: Some(rule.id),
//!                 ..Default::default()
//!             },
//!         )
//!         .await?;
//!     println!("Created task: {}", task.title);
//!
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod repository;
pub mod scheduler;
