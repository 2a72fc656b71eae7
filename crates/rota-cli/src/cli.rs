use clap::{Parser, Subcommand};
use rota_core::models::{Frequency, TaskPriority, TaskStatus};

/// A CLI task manager with rule-based recurring tasks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Act as this user instead of the configured one
    #[clap(long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a new task
    Add(AddCommand),
    /// List tasks
    List(ListCommand),
    /// Delete a task
    Delete(DeleteCommand),
    /// Mark a task as completed
    Do(DoCommand),
    /// Edit a task
    Edit(EditCommand),
    /// Manage categories
    Category(CategoryCommand),
    /// Manage recurrence rules
    Rule(RuleCommand),
    /// Re-apply recurrence to recently completed tasks
    Sweep(SweepCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The title of the task
    pub title: String,
    /// The description of the task
    #[clap(short, long)]
    pub description: Option<String>,
    /// The due date of the task (e.g. 'tomorrow', '2026-09-15')
    #[clap(long)]
    pub due: Option<String>,
    /// The category of the task
    #[clap(short, long)]
    pub category: Option<String>,
    /// Tags to add to the task
    #[clap(short, long, num_args = 1..)]
    pub tag: Vec<String>,
    /// The priority of the task (none, low, medium, high)
    #[clap(long)]
    pub priority: Option<TaskPriority>,
    /// ID of a recurrence rule to attach
    #[clap(long)]
    pub rule: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Filter by status (not_started, in_progress, completed)
    #[clap(long)]
    pub status: Option<TaskStatus>,
    /// Filter by tag
    #[clap(long)]
    pub tag: Option<String>,
    /// Filter by category
    #[clap(long)]
    pub category: Option<String>,
    /// Filter by priority
    #[clap(long)]
    pub priority: Option<TaskPriority>,
    /// Filter by due date: 'today', 'overdue', 'before:<date>' or 'after:<date>'
    #[clap(long)]
    pub due: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID of the task to delete
    pub id: String,
    /// Force deletion without confirmation
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DoCommand {
    /// The ID of the task to mark as completed
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// The ID of the task to edit
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, conflicts_with = "description")]
    pub description_clear: bool,

    #[arg(long)]
    pub due: Option<String>,
    #[arg(long, conflicts_with = "due")]
    pub due_clear: bool,

    #[arg(long)]
    pub priority: Option<TaskPriority>,

    #[arg(long)]
    pub status: Option<TaskStatus>,

    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, conflicts_with = "category")]
    pub category_clear: bool,

    /// Attach a recurrence rule
    #[arg(long)]
    pub rule: Option<String>,
    #[arg(long, conflicts_with = "rule")]
    pub rule_clear: bool,

    /// Add tags to the task
    #[arg(long, num_args = 1..)]
    pub add_tag: Vec<String>,

    /// Remove tags from the task
    #[arg(long, num_args = 1..)]
    pub remove_tag: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CategoryCommand {
    #[command(subcommand)]
    pub command: CategorySubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CategorySubcommand {
    /// Add a new category
    Add(AddCategoryCommand),
    /// List categories
    List,
    /// Delete a category (tasks keep existing, uncategorized)
    Delete(DeleteCategoryCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCategoryCommand {
    /// The name of the category
    pub name: String,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCategoryCommand {
    /// The name of the category to delete
    pub name: String,
}

#[derive(Parser, Debug, Clone)]
pub struct RuleCommand {
    #[command(subcommand)]
    pub command: RuleSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RuleSubcommand {
    /// Create a recurrence rule
    Create(CreateRuleCommand),
    /// List all rules
    List,
    /// Show a single rule with its upcoming occurrences
    Show(ShowRuleCommand),
    /// Update a rule
    Update(UpdateRuleCommand),
    /// Delete a rule (fails while tasks still reference it)
    Delete(DeleteRuleCommand),
    /// Preview the next occurrences of a rule
    Preview(PreviewRuleCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct CreateRuleCommand {
    /// The frequency (daily, weekly, monthly, yearly)
    #[clap(long)]
    pub every: Frequency,
    /// Repeat every N periods
    #[clap(long)]
    pub interval: Option<i64>,
    /// Days of week for weekly rules (e.g. 'MO,WE,FR')
    #[clap(long)]
    pub on: Option<String>,
    /// Days of month for monthly rules (e.g. '15,-1'; -1 is the last day)
    #[clap(long)]
    pub day: Option<String>,
    /// Stop generating occurrences after this date
    #[clap(long)]
    pub until: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowRuleCommand {
    /// The ID of the rule
    pub id: String,
    /// Number of upcoming occurrences to show
    #[clap(long, short, default_value = "5")]
    pub count: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct UpdateRuleCommand {
    /// The ID of the rule to update
    pub id: String,
    #[clap(long)]
    pub every: Option<Frequency>,
    #[clap(long)]
    pub interval: Option<i64>,
    /// Replace the weekday list (e.g. 'MO,WE,FR'; empty string clears it)
    #[clap(long)]
    pub on: Option<String>,
    /// Replace the month-day list (e.g. '15,-1'; empty string clears it)
    #[clap(long)]
    pub day: Option<String>,
    #[clap(long)]
    pub until: Option<String>,
    #[clap(long, conflicts_with = "until")]
    pub until_clear: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteRuleCommand {
    /// The ID of the rule to delete
    pub id: String,
    /// Force deletion without confirmation
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PreviewRuleCommand {
    /// The ID of the rule
    pub id: String,
    /// Number of occurrences to show
    #[clap(long, short, default_value = "10")]
    pub count: usize,
    /// Start walking from this date instead of now
    #[clap(long)]
    pub from: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct SweepCommand {
    /// Keep running, sweeping at the configured interval
    #[clap(long)]
    pub watch: bool,
}
