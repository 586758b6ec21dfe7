use std::sync::Arc;

use anyhow::{bail, Context, Result};
use budgetdesk_api::BudgetApiClient;
use budgetdesk_core::budgets::{is_new_budget, BudgetRepositoryTrait};
use budgetdesk_core::constants::NEW_BUDGET_ID;
use budgetdesk_core::records::{format_amount, RecordEdit, RecordField};
use budgetdesk_core::users::UserRepositoryTrait;
use budgetdesk_core::workspace::{CommitOutcome, WorkspaceError, WorkspaceSnapshot};

use crate::main_lib::build_workspace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show { budget_id: i64, json: bool },
    List,
    Add(AddArgs),
    WhoAmI,
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddArgs {
    pub budget_id: i64,
    pub name: String,
    pub total: String,
    pub spending_date: Option<String>,
    pub comment: Option<String>,
}

impl Command {
    /// Parses the arguments following the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some(command) = args.first() else {
            return Ok(Command::Help);
        };
        let rest = &args[1..];
        match command.as_str() {
            "show" => {
                let id = rest
                    .iter()
                    .find(|a| !a.starts_with("--"))
                    .context("Usage: budgetdesk show <budget-id> [--json]")?;
                Ok(Command::Show {
                    budget_id: parse_budget_id(id)?,
                    json: rest.iter().any(|a| a == "--json"),
                })
            }
            "list" | "ls" => Ok(Command::List),
            "add" => {
                if rest.len() < 3 {
                    bail!("Usage: budgetdesk add <budget-id|new> <name> <total> [spending-date] [comment]");
                }
                Ok(Command::Add(AddArgs {
                    budget_id: parse_budget_id(&rest[0])?,
                    name: rest[1].clone(),
                    total: rest[2].clone(),
                    spending_date: rest.get(3).cloned(),
                    comment: rest.get(4).cloned(),
                }))
            }
            "whoami" => Ok(Command::WhoAmI),
            "--help" | "-h" | "help" => Ok(Command::Help),
            "--version" | "-V" | "version" => Ok(Command::Version),
            other => {
                print_usage();
                bail!("Unknown command: {other}");
            }
        }
    }
}

/// `new` opens an unsaved budget; anything else must be a positive identity.
fn parse_budget_id(raw: &str) -> Result<i64> {
    if raw.eq_ignore_ascii_case("new") {
        return Ok(NEW_BUDGET_ID);
    }
    let id: i64 = raw
        .parse()
        .with_context(|| format!("Invalid budget id: {raw}"))?;
    if id < 0 {
        bail!("Invalid budget id: {raw}");
    }
    Ok(id)
}

pub async fn run(command: Command, client: Arc<BudgetApiClient>) -> Result<()> {
    match command {
        Command::Show { budget_id, json } => show(&client, budget_id, json).await,
        Command::List => list(&client).await,
        Command::Add(args) => add(&client, args).await,
        Command::WhoAmI => {
            let user = client.get_current_user().await?;
            println!("{} <{}>", user.display_name(), user.email);
            Ok(())
        }
        Command::Help => {
            print_usage();
            Ok(())
        }
        Command::Version => {
            println!("budgetdesk {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

pub fn print_usage() {
    println!("Budgetdesk - budget record grid over the budget service");
    println!();
    println!("Usage: budgetdesk <command>");
    println!();
    println!("Commands:");
    println!("  show <budget-id> [--json]     Print the records of a budget and their total");
    println!("  list                          List all budgets");
    println!("  add <budget-id|new> <name> <total> [spending-date] [comment]");
    println!("                                Add a record; 'new' creates a budget for it");
    println!("  whoami                        Show the signed-in user");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

async fn show(client: &Arc<BudgetApiClient>, budget_id: i64, json: bool) -> Result<()> {
    let mut workspace = build_workspace(client);
    workspace.initialize(budget_id).await?;
    let snapshot = workspace.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_grid(&snapshot);
    }
    Ok(())
}

async fn list(client: &Arc<BudgetApiClient>) -> Result<()> {
    let budgets = client.list_budgets().await?;
    if budgets.is_empty() {
        println!("No budgets yet.");
        return Ok(());
    }
    for budget in budgets {
        println!("{:>6}  {}", budget.id, budget.name);
    }
    Ok(())
}

async fn add(client: &Arc<BudgetApiClient>, args: AddArgs) -> Result<()> {
    let mut workspace = build_workspace(client);
    workspace.initialize(args.budget_id).await?;

    let row = workspace.add_record()?;
    workspace.edit_field(row, RecordEdit::parse(RecordField::Total, &args.total)?)?;
    if let Some(date) = &args.spending_date {
        workspace.edit_field(row, RecordEdit::parse(RecordField::SpendingDate, date)?)?;
    }
    if let Some(comment) = args.comment {
        workspace.edit_field(row, RecordEdit::Comment(comment))?;
    }

    if is_new_budget(args.budget_id) {
        workspace.edit_field(row, RecordEdit::Name(args.name))?;
        let outcome = workspace.save_and_exit().await.map_err(explain)?;
        println!(
            "Created budget {} ({})",
            outcome.budget_id,
            outcome.navigation.path()
        );
    } else {
        // Committing the name creates the row, as leaving the name cell would
        match workspace
            .commit_field(row, RecordEdit::Name(args.name))
            .await
            .map_err(explain)?
        {
            CommitOutcome::Created(id) => println!("Created record {id}"),
            CommitOutcome::Updated => println!("Updated record"),
            CommitOutcome::Deferred(reason) => bail!("Record was not saved: {reason:?}"),
        }
    }
    println!(
        "Budget total: {}",
        format_amount(workspace.snapshot().aggregate_total)
    );
    Ok(())
}

fn print_grid(snapshot: &WorkspaceSnapshot) {
    println!("{} (#{})", snapshot.budget_name, snapshot.budget_id);
    println!(
        "{:>6}  {:<24} {:<10} {:>12}  {}",
        "id", "name", "date", "total", "comment"
    );
    for record in &snapshot.records {
        let id = record
            .identity
            .id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let date = record
            .spending_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!(
            "{:>6}  {:<24} {:<10} {:>12}  {}",
            id,
            record.name,
            date,
            format_amount(record.total),
            record.comment.as_deref().unwrap_or("")
        );
    }
    println!("{:>55}", format!("Total: {}", snapshot.formatted_total()));
}

/// Spells out per-row violations, which the error's own message only counts.
fn explain(err: WorkspaceError) -> anyhow::Error {
    if let WorkspaceError::Validation(rows) = &err {
        let details: Vec<String> = rows
            .iter()
            .flat_map(|row| {
                row.violations
                    .iter()
                    .map(move |v| format!("row {} {}: {}", row.row + 1, v.field, v.message))
            })
            .collect();
        return anyhow::anyhow!("{}: {}", err, details.join("; "));
    }
    err.into()
}
