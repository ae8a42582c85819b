//! Command handlers behind the shell registry.

use std::collections::HashMap;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::{
    advice::{self, AdviceSnapshot, GeminiClient},
    cli::{
        context::{CommandError, CommandResult, LoopControl, ShellContext},
        output,
        registry::{CommandEntry, CommandRegistry},
    },
    domain::{BudgetCategory, Direction, IncomeClass, NamedEntity, TransactionDraft},
    engine::{parse_amount, validate_percentages, percentage_sum},
};

pub fn default_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry.register(CommandEntry::new(
        "help",
        "List commands or show usage for one",
        "help [command]",
        cmd_help,
    ));
    registry.register(CommandEntry::new(
        "income",
        "Set the declared monthly income",
        "income <amount>",
        cmd_income,
    ));
    registry.register(CommandEntry::new(
        "add",
        "Record an income or expense transaction",
        "add <income|expense> <amount> <description...> [--account <id>] [--category <id>] [--class <E|S|B|I|P>]",
        cmd_add,
    ));
    registry.register(CommandEntry::new(
        "delete",
        "Delete a transaction and reverse its balance effect",
        "delete <transaction-id>",
        cmd_delete,
    ));
    registry.register(CommandEntry::new(
        "budget",
        "Show or edit envelope percentages (staged until `budget save`)",
        "budget [set <id> <pct> | rename <id> <name...> | add <name> [pct] | remove <id> | save | discard]",
        cmd_budget,
    ));
    registry.register(CommandEntry::new(
        "summary",
        "Per-envelope allocation, spend, and remainder",
        "summary",
        cmd_summary,
    ));
    registry.register(CommandEntry::new(
        "accounts",
        "List account balances",
        "accounts",
        cmd_accounts,
    ));
    registry.register(CommandEntry::new(
        "history",
        "List transactions, newest first",
        "history",
        cmd_history,
    ));
    registry.register(CommandEntry::new(
        "advice",
        "Ask the AI advisor about the current budget",
        "advice",
        cmd_advice,
    ));
    registry.register(CommandEntry::new(
        "exit",
        "Leave the shell",
        "exit",
        cmd_exit,
    ));
    registry
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match context.registry().get(&name.to_lowercase()) {
            Some(entry) => {
                output::info(format!("{} - {}", entry.name, entry.description));
                output::info(format!("Usage: {}", entry.usage));
            }
            None => context.suggest_command(name),
        }
        return Ok(LoopControl::Continue);
    }

    let rows: Vec<Vec<String>> = context
        .registry()
        .list()
        .iter()
        .map(|entry| vec![entry.name.to_string(), entry.description.to_string()])
        .collect();
    output::render_table(&["Command", "Description"], &rows);
    Ok(LoopControl::Continue)
}

fn cmd_income(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(raw) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "income expects an amount".into(),
        ));
    };
    let amount = parse_amount(raw);
    context.engine.set_income(amount)?;
    output::success(format!(
        "Monthly income set to {}",
        output::format_vnd(amount)
    ));
    Ok(LoopControl::Continue)
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (positional, flags) = split_flags(args)?;
    let mut positional = positional.into_iter();

    let direction = match positional.next() {
        Some("income") => Direction::Income,
        Some("expense") => Direction::Expense,
        _ => {
            return Err(CommandError::InvalidArguments(
                "add expects `income` or `expense` first".into(),
            ))
        }
    };
    let amount = positional
        .next()
        .map(parse_amount)
        .ok_or_else(|| CommandError::InvalidArguments("add expects an amount".into()))?;
    let mut description = positional.collect::<Vec<_>>().join(" ");
    if description.trim().is_empty() && context.is_interactive() {
        description = Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Description")
            .interact_text()?;
    }

    let account_id = match flags.get("account") {
        Some(id) => id.to_string(),
        None => pick_account(context)?,
    };

    let mut draft = TransactionDraft {
        amount,
        description,
        direction,
        account_id,
        category_id: None,
        income_class: None,
        date: None,
    };

    match direction {
        Direction::Expense => {
            draft.category_id = Some(match flags.get("category") {
                Some(id) => id.to_string(),
                None => pick_category(context)?,
            });
        }
        Direction::Income => {
            draft.income_class = match flags.get("class") {
                Some(raw) => Some(
                    raw.parse::<IncomeClass>()
                        .map_err(CommandError::InvalidArguments)?,
                ),
                None => pick_income_class(context)?,
            };
        }
    }

    let id = context.engine.add_transaction(draft)?;
    output::success(format!("Transaction recorded ({})", id));
    Ok(LoopControl::Continue)
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(id) = args.first() else {
        return Err(CommandError::InvalidArguments(
            "delete expects a transaction id".into(),
        ));
    };

    if context.is_interactive() {
        if let Some(txn) = context.engine.state().transaction(id) {
            let prompt = format!(
                "Delete `{}` ({})?",
                txn.description,
                output::format_vnd(txn.amount)
            );
            let confirmed = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .default(false)
                .interact()?;
            if !confirmed {
                return Err(CommandError::Aborted("Deletion cancelled.".into()));
            }
        }
    }

    if context.engine.delete_transaction(id)? {
        output::success(format!("Transaction {} deleted.", id));
    } else {
        output::info(format!("No transaction with id {}.", id));
    }
    Ok(LoopControl::Continue)
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().copied() {
        None | Some("show") => show_budget(context),
        Some("set") => {
            let (id, pct) = match (args.get(1), args.get(2)) {
                (Some(id), Some(pct)) => (id.to_string(), parse_amount(pct)),
                _ => {
                    return Err(CommandError::InvalidArguments(
                        "budget set expects an envelope id and a percentage".into(),
                    ))
                }
            };
            let draft = draft_mut(context);
            let Some(envelope) = draft.iter_mut().find(|c| c.id == id) else {
                return Err(CommandError::InvalidArguments(format!(
                    "no envelope with id {} in the draft",
                    id
                )));
            };
            envelope.percentage = pct;
            show_budget(context)
        }
        Some("rename") => {
            let Some(id) = args.get(1).map(|id| id.to_string()) else {
                return Err(CommandError::InvalidArguments(
                    "budget rename expects an envelope id and a new name".into(),
                ));
            };
            let name = args[2..].join(" ");
            if name.trim().is_empty() {
                return Err(CommandError::InvalidArguments(
                    "budget rename expects a new name".into(),
                ));
            }
            let draft = draft_mut(context);
            let Some(envelope) = draft.iter_mut().find(|c| c.id == id) else {
                return Err(CommandError::InvalidArguments(format!(
                    "no envelope with id {} in the draft",
                    id
                )));
            };
            envelope.name = name;
            show_budget(context)
        }
        Some("add") => {
            let Some(name) = args.get(1) else {
                return Err(CommandError::InvalidArguments(
                    "budget add expects an envelope name".into(),
                ));
            };
            let mut envelope = BudgetCategory::custom(*name);
            if let Some(pct) = args.get(2) {
                envelope.percentage = parse_amount(pct);
            }
            draft_mut(context).push(envelope);
            show_budget(context)
        }
        Some("remove") => {
            let Some(id) = args.get(1).map(|id| id.to_string()) else {
                return Err(CommandError::InvalidArguments(
                    "budget remove expects an envelope id".into(),
                ));
            };
            let draft = draft_mut(context);
            let Some(envelope) = draft.iter().find(|c| c.id == id) else {
                return Err(CommandError::InvalidArguments(format!(
                    "no envelope with id {} in the draft",
                    id
                )));
            };
            if !envelope.is_deletable() {
                return Err(CommandError::InvalidArguments(format!(
                    "envelope `{}` is a seeded fund and cannot be removed",
                    envelope.name
                )));
            }
            draft.retain(|c| c.id != id);
            show_budget(context)
        }
        Some("save") => {
            let Some(draft) = context.budget_draft.clone() else {
                output::info("No staged envelope changes.");
                return Ok(LoopControl::Continue);
            };
            context.engine.replace_categories(draft)?;
            context.budget_draft = None;
            output::success("Envelope percentages saved.");
            Ok(LoopControl::Continue)
        }
        Some("discard") => {
            if context.budget_draft.take().is_some() {
                output::info("Staged envelope changes discarded.");
            } else {
                output::info("No staged envelope changes.");
            }
            Ok(LoopControl::Continue)
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown budget subcommand `{}`",
            other
        ))),
    }
}

fn show_budget(context: &mut ShellContext) -> CommandResult {
    let staged = context.budget_draft.is_some();
    let envelopes: Vec<BudgetCategory> = context
        .budget_draft
        .clone()
        .unwrap_or_else(|| context.engine.state().categories.clone());

    let rows: Vec<Vec<String>> = envelopes
        .iter()
        .map(|envelope| {
            vec![
                envelope.id.clone(),
                envelope.name.clone(),
                envelope.kind.to_string(),
                format!("{}%", envelope.percentage),
            ]
        })
        .collect();
    output::section(if staged {
        "Budget envelopes (staged, not saved)"
    } else {
        "Budget envelopes"
    });
    output::render_table(&["ID", "Name", "Kind", "Percent"], &rows);

    let sum = percentage_sum(&envelopes);
    match validate_percentages(&envelopes) {
        Ok(()) => output::success(format!("Total allocation: {}%", sum)),
        Err(_) => output::warning(format!(
            "Total allocation: {}%; must equal 100% before `budget save`",
            sum
        )),
    }
    Ok(LoopControl::Continue)
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let width = output::bar_width();
    let summary = context.engine.budget_summary();

    output::section("Spending by envelope");
    for row in &summary {
        println!(
            "{:<16} {:>14} / {:<14} {}",
            row.category.name,
            output::format_vnd(row.spent),
            output::format_vnd(row.allocated),
            output::progress_bar(row.spent, row.allocated, width),
        );
        if row.remaining < 0.0 {
            output::warning(format!(
                "  over budget by {}",
                output::format_vnd(-row.remaining)
            ));
        }
    }

    let totals = context.engine.totals();
    output::section("Totals");
    output::info(format!(
        "Recorded income:  {}",
        output::format_vnd(totals.total_income)
    ));
    output::info(format!(
        "Recorded expense: {}",
        output::format_vnd(totals.total_expense)
    ));
    output::info(format!(
        "Total balance:    {}",
        output::format_vnd(totals.total_balance)
    ));
    output::info(format!(
        "Allocation total: {}%",
        totals.total_allocation_percentage
    ));
    Ok(LoopControl::Continue)
}

fn cmd_accounts(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let state = context.engine.state();
    let rows: Vec<Vec<String>> = state
        .accounts
        .iter()
        .map(|account| {
            vec![
                account.id.clone(),
                account.name.clone(),
                account.kind.to_string(),
                output::format_vnd(account.balance),
            ]
        })
        .collect();
    output::render_table(&["ID", "Name", "Kind", "Balance"], &rows);
    output::info(format!(
        "Total balance: {}",
        output::format_vnd(context.engine.totals().total_balance)
    ));
    Ok(LoopControl::Continue)
}

fn cmd_history(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let state = context.engine.state();
    if state.transactions.is_empty() {
        output::info("No transactions recorded yet.");
        return Ok(LoopControl::Continue);
    }

    let rows: Vec<Vec<String>> = state
        .transactions
        .iter()
        .map(|txn| {
            let label = match txn.direction {
                Direction::Income => txn
                    .income_class
                    .map(|class| class.label().to_string())
                    .unwrap_or_else(|| "Thu nhập".into()),
                Direction::Expense => txn
                    .category_id
                    .as_deref()
                    .and_then(|id| state.category(id))
                    .map(|category| category.name().to_string())
                    .unwrap_or_else(|| "(removed envelope)".into()),
            };
            let account = state
                .account(&txn.account_id)
                .map(|account| account.name().to_string())
                .unwrap_or_else(|| txn.account_id.clone());
            let amount = match txn.direction {
                Direction::Income => format!("+{}", output::format_vnd(txn.amount)),
                Direction::Expense => format!("-{}", output::format_vnd(txn.amount)),
            };
            vec![
                txn.date.format("%d/%m/%Y").to_string(),
                txn.description.clone(),
                label,
                account,
                amount,
                txn.id.clone(),
            ]
        })
        .collect();
    output::render_table(
        &["Date", "Description", "Category", "Account", "Amount", "ID"],
        &rows,
    );
    Ok(LoopControl::Continue)
}

fn cmd_advice(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let client = GeminiClient::from_config(&context.config.advice);
    let snapshot = AdviceSnapshot::capture(context.engine.state());
    output::info("Consulting the advisor...");
    let text = advice::fetch_advice(&client, &snapshot);
    output::section("Phân tích từ FinSmart AI");
    println!("{}", text);
    Ok(LoopControl::Continue)
}

fn cmd_exit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.budget_draft.is_some() {
        output::warning("Staged envelope changes were not saved.");
    }
    Ok(LoopControl::Exit)
}

/// Clones the committed envelope list into the draft on first edit.
fn draft_mut(context: &mut ShellContext) -> &mut Vec<BudgetCategory> {
    if context.budget_draft.is_none() {
        context.budget_draft = Some(context.engine.state().categories.clone());
    }
    context.budget_draft.as_mut().expect("draft just staged")
}

/// Splits `--flag value` pairs out of an argument list.
fn split_flags<'a>(
    args: &[&'a str],
) -> Result<(Vec<&'a str>, HashMap<&'a str, &'a str>), CommandError> {
    let mut positional = Vec::new();
    let mut flags = HashMap::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(name) = arg.strip_prefix("--") {
            let value = iter.next().ok_or_else(|| {
                CommandError::InvalidArguments(format!("flag --{} expects a value", name))
            })?;
            flags.insert(name, *value);
        } else {
            positional.push(*arg);
        }
    }
    Ok((positional, flags))
}

fn pick_account(context: &ShellContext) -> Result<String, CommandError> {
    let accounts = &context.engine.state().accounts;
    if !context.is_interactive() {
        return Err(CommandError::InvalidArguments(
            "--account <id> is required in script mode".into(),
        ));
    }
    let labels: Vec<String> = accounts
        .iter()
        .map(|account| {
            format!(
                "{} - {}",
                account.name,
                output::format_vnd(account.balance)
            )
        })
        .collect();
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Account")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(accounts[choice].id.clone())
}

fn pick_category(context: &ShellContext) -> Result<String, CommandError> {
    let categories = &context.engine.state().categories;
    if !context.is_interactive() {
        return Err(CommandError::InvalidArguments(
            "--category <id> is required for expenses in script mode".into(),
        ));
    }
    let labels: Vec<String> = categories
        .iter()
        .map(|category| format!("{} ({}%)", category.name, category.percentage))
        .collect();
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Envelope")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(categories[choice].id.clone())
}

fn pick_income_class(context: &ShellContext) -> Result<Option<IncomeClass>, CommandError> {
    if !context.is_interactive() {
        return Ok(None);
    }
    let classes = IncomeClass::all();
    let mut labels: Vec<String> = classes.iter().map(|class| class.label().into()).collect();
    labels.push("(skip)".into());
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Income classification")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(classes.get(choice).copied())
}
