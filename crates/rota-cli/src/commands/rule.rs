use anyhow::Result;
use chrono::Utc;
use dialoguer::Confirm;
use owo_colors::OwoColorize;
use rota_core::models::{NewRuleData, UpdateRuleData};
use rota_core::repository::Repository;

use crate::cli::{
    CreateRuleCommand, DeleteRuleCommand, PreviewRuleCommand, RuleCommand, RuleSubcommand,
    ShowRuleCommand, UpdateRuleCommand,
};
use crate::parser::{parse_due_date, parse_month_days, parse_weekdays};
use crate::util::resolve_rule_id;
use crate::views::table::{display_occurrences, display_rules};

pub async fn rule_command(repo: &impl Repository, command: RuleCommand) -> Result<()> {
    match command.command {
        RuleSubcommand::Create(cmd) => create_rule(repo, cmd).await,
        RuleSubcommand::List => list_rules(repo).await,
        RuleSubcommand::Show(cmd) => show_rule(repo, cmd).await,
        RuleSubcommand::Update(cmd) => update_rule(repo, cmd).await,
        RuleSubcommand::Delete(cmd) => delete_rule(repo, cmd).await,
        RuleSubcommand::Preview(cmd) => preview_rule(repo, cmd).await,
    }
}

async fn create_rule(repo: &impl Repository, command: CreateRuleCommand) -> Result<()> {
    let by_weekday = command
        .on
        .as_deref()
        .map(parse_weekdays)
        .transpose()?
        .unwrap_or_default();
    let by_month_day = command
        .day
        .as_deref()
        .map(parse_month_days)
        .transpose()?
        .unwrap_or_default();
    let end_date = command.until.as_deref().map(parse_due_date).transpose()?;

    let rule = repo
        .create_rule(NewRuleData {
            frequency: command.every,
            interval: command.interval,
            by_weekday,
            by_month_day,
            end_date,
        })
        .await?;

    println!(
        "{} Created {} rule: {}",
        "✓".green().bold(),
        rule.frequency,
        rule.id.to_string().yellow()
    );
    Ok(())
}

async fn list_rules(repo: &impl Repository) -> Result<()> {
    let rules = repo.find_rules().await?;
    display_rules(&rules);
    Ok(())
}

async fn show_rule(repo: &impl Repository, command: ShowRuleCommand) -> Result<()> {
    let rule_id = resolve_rule_id(repo, &command.id).await?;
    let rule = repo
        .find_rule_by_id(rule_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Rule not found"))?;

    display_rules(std::slice::from_ref(&rule));

    let dates = repo
        .upcoming_occurrences(rule_id, Utc::now(), command.count)
        .await?;
    println!("\nUpcoming occurrences:");
    display_occurrences(&dates);
    Ok(())
}

async fn update_rule(repo: &impl Repository, command: UpdateRuleCommand) -> Result<()> {
    let rule_id = resolve_rule_id(repo, &command.id).await?;

    let end_date = if command.until_clear {
        Some(None)
    } else {
        command
            .until
            .as_deref()
            .map(parse_due_date)
            .transpose()?
            .map(Some)
    };

    let updated = repo
        .update_rule(
            rule_id,
            UpdateRuleData {
                frequency: command.every,
                interval: command.interval,
                by_weekday: command.on.as_deref().map(parse_weekdays).transpose()?,
                by_month_day: command.day.as_deref().map(parse_month_days).transpose()?,
                end_date,
            },
        )
        .await?;

    println!("Updated rule {}", updated.id.to_string().yellow());
    display_rules(std::slice::from_ref(&updated));
    Ok(())
}

async fn delete_rule(repo: &impl Repository, command: DeleteRuleCommand) -> Result<()> {
    let rule_id = resolve_rule_id(repo, &command.id).await?;

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!("Are you sure you want to delete rule '{}'?", rule_id))
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    repo.delete_rule(rule_id).await?;
    println!("Deleted rule {}", rule_id);
    Ok(())
}

async fn preview_rule(repo: &impl Repository, command: PreviewRuleCommand) -> Result<()> {
    let rule_id = resolve_rule_id(repo, &command.id).await?;
    let from = command
        .from
        .as_deref()
        .map(parse_due_date)
        .transpose()?
        .unwrap_or_else(Utc::now);

    let dates = repo
        .upcoming_occurrences(rule_id, from, command.count)
        .await?;
    display_occurrences(&dates);
    Ok(())
}
