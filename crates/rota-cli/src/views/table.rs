use chrono::{DateTime, Utc};
use comfy_table::{Attribute, Cell, Color, Row, Table};
use rota_core::models::{Category, RecurrenceRule, TaskPriority, TaskStatus};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ViewTask {
    pub id: Uuid,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_at: Option<DateTime<Utc>>,
    pub category_name: Option<String>,
    pub tags: Vec<String>,
    pub recurring: bool,
}

pub fn display_tasks(tasks: &[ViewTask]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Status", "Due Date", "Category", "Tags"]);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(&task.id.simple().to_string()[..7]));

        let mut display_title = String::new();
        if task.recurring {
            display_title.push('↻');
            display_title.push(' ');
        }
        display_title.push_str(&task.title);

        let mut title_cell = Cell::new(display_title);
        match task.status {
            TaskStatus::Completed => {
                title_cell = title_cell
                    .add_attribute(Attribute::CrossedOut)
                    .fg(Color::DarkGrey);
            }
            TaskStatus::NotStarted | TaskStatus::InProgress => {
                title_cell = match task.priority {
                    TaskPriority::High => title_cell.fg(Color::Red).add_attribute(Attribute::Bold),
                    TaskPriority::Medium => title_cell.fg(Color::Yellow),
                    TaskPriority::Low => title_cell.fg(Color::Green),
                    TaskPriority::None => title_cell,
                };
            }
        };
        row.add_cell(title_cell);

        let status_cell = match task.status {
            TaskStatus::Completed => Cell::new("Completed").fg(Color::Green),
            TaskStatus::InProgress => Cell::new("In progress").fg(Color::Cyan),
            TaskStatus::NotStarted => Cell::new("Not started"),
        };
        row.add_cell(status_cell);

        let due_date_cell = if let Some(due_at) = task.due_at {
            let now = Utc::now();
            let due_text = due_at.format("%Y-%m-%d %H:%M").to_string();
            if task.status != TaskStatus::Completed {
                if due_at < now {
                    Cell::new(due_text).fg(Color::Red) // Overdue
                } else if due_at.date_naive() == now.date_naive() {
                    Cell::new(due_text).fg(Color::Yellow) // Due today
                } else {
                    Cell::new(due_text)
                }
            } else {
                Cell::new(due_text)
            }
        } else {
            Cell::new("None")
        };
        row.add_cell(due_date_cell);

        row.add_cell(Cell::new(task.category_name.as_deref().unwrap_or("None")));
        row.add_cell(Cell::new(if task.tags.is_empty() {
            "None".to_string()
        } else {
            task.tags.join(", ")
        }));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("No categories found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Created At"]);

    for category in categories {
        let mut row = Row::new();
        row.add_cell(Cell::new(&category.id.simple().to_string()[..7]));
        row.add_cell(Cell::new(&category.name));
        row.add_cell(Cell::new(
            category.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_rules(rules: &[RecurrenceRule]) {
    if rules.is_empty() {
        println!("No rules found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ID",
        "Frequency",
        "Interval",
        "Weekdays",
        "Month Days",
        "End Date",
    ]);

    for rule in rules {
        let mut row = Row::new();
        row.add_cell(Cell::new(&rule.id.simple().to_string()[..7]));
        row.add_cell(Cell::new(rule.frequency.to_string()));
        row.add_cell(Cell::new(rule.interval.to_string()));
        row.add_cell(Cell::new(format_weekdays(&rule.by_weekday.0)));
        row.add_cell(Cell::new(format_month_days(&rule.by_month_day.0)));
        row.add_cell(Cell::new(
            rule.end_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "None".to_string()),
        ));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_occurrences(dates: &[DateTime<Utc>]) {
    if dates.is_empty() {
        println!("No upcoming occurrences.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Weekday"]);
    for (i, date) in dates.iter().enumerate() {
        let mut row = Row::new();
        row.add_cell(Cell::new((i + 1).to_string()));
        row.add_cell(Cell::new(date.format("%Y-%m-%d %H:%M").to_string()));
        row.add_cell(Cell::new(date.format("%A").to_string()));
        table.add_row(row);
    }
    println!("{table}");
}

fn format_weekdays(days: &[rota_core::models::Weekday]) -> String {
    if days.is_empty() {
        "None".to_string()
    } else {
        days.iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn format_month_days(days: &[i32]) -> String {
    if days.is_empty() {
        "None".to_string()
    } else {
        days.iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}
