use crate::cmd::prompt::{ask, read_line};
use crate::cmd::tickets::{parse_category, parse_priority, use_color};
use crate::context::AppContext;
use crate::display::{render_card, render_list, render_stats};
use crate::domain::{FilterField, TicketId};
use crate::error::AppResult;
use crate::store::TicketStore;
use crate::workflow::filter::{FilterController, RefreshOutcome};
use crate::workflow::form::{SubmitOutcome, TicketForm};
use crate::workflow::session::Session;
use crate::workflow::status::{AdvanceOutcome, STATUS_UPDATE_FAILED};

const HELP: &str = "\
Commands:
  list                         reload and show the tickets for the current filters
  filter <field> [value]       field is category, priority, status or search; no value clears it
                               (runs in the background; quick search edits are merged)
  clear                        remove all filters
  new                          fill in and submit a ticket
  advance <id>                 move a ticket to its next status
  stats                        show the dashboard
  help                         show this message
  quit                         leave the shell";

enum Command {
    List,
    Filter(String, String),
    Clear,
    New,
    Advance(String),
    Stats,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.trim().splitn(3, char::is_whitespace);
    let verb = parts.next().unwrap_or_default().to_lowercase();
    let first = parts.next().unwrap_or_default().to_string();
    let rest = parts.next().unwrap_or_default().trim().to_string();

    match verb.as_str() {
        "list" | "ls" => Ok(Command::List),
        "filter" if !first.is_empty() => Ok(Command::Filter(first, rest)),
        "filter" => Err("usage: filter <field> [value]".to_string()),
        "clear" => Ok(Command::Clear),
        "new" => Ok(Command::New),
        "advance" if !first.is_empty() => Ok(Command::Advance(first)),
        "advance" => Err("usage: advance <id>".to_string()),
        "stats" => Ok(Command::Stats),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}'; type 'help'")),
    }
}

/// Interactive session over a single page worth of state: the filtered
/// list, the new-ticket form and the dashboard.
pub async fn run(ctx: &AppContext) -> AppResult<()> {
    let session = Session::new(ctx.api.clone(), ctx.config.search_debounce);
    let color = use_color();

    println!("Support desk at {}. Type 'help' for commands.", ctx.config.api_base_url);
    match session.filters.refresh().await {
        Ok(_) => println!("{}", render_list(&session.store.snapshot(), color)),
        Err(err) => println!("Could not load tickets: {err}"),
    }

    loop {
        let Some(line) = read_line("> ")? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match command {
            Command::List => match session.filters.refresh().await {
                Ok(_) => println!("{}", render_list(&session.store.snapshot(), color)),
                Err(err) => println!("Could not load tickets: {err}"),
            },
            Command::Filter(field, value) => {
                let Some(field) = FilterField::from_str(&field) else {
                    println!("unknown filter '{field}'");
                    continue;
                };
                // Not awaited, so the next edit can arrive inside the debounce window.
                let filters = session.filters.clone();
                let store = session.store.clone();
                tokio::spawn(async move {
                    if let Some(report) = apply_filter(&filters, &store, field, &value, color).await
                    {
                        println!("\n{report}");
                    }
                });
            }
            Command::Clear => match session.filters.clear().await {
                Ok(_) => println!("{}", render_list(&session.store.snapshot(), color)),
                Err(err) => println!("{err}"),
            },
            Command::New => fill_and_submit(&session.form).await?,
            Command::Advance(id) => match session.advance(&TicketId::new(id.as_str())).await {
                Ok(Some(AdvanceOutcome::Advanced(ticket))) => {
                    println!("{}", render_card(&ticket, color))
                }
                Ok(Some(AdvanceOutcome::Terminal)) => println!("Ticket {id} is already closed."),
                Ok(None) => println!("No ticket {id} in the current list."),
                Err(_) => println!("{STATUS_UPDATE_FAILED}"),
            },
            Command::Stats => {
                if let Err(err) = session.stats.load().await {
                    println!("Could not load stats: {err}");
                }
                println!("{}", render_stats(session.stats.snapshot().as_ref()));
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }

    Ok(())
}

/// What to print after a filter change; `None` when a newer change took over.
async fn apply_filter(
    filters: &FilterController,
    store: &TicketStore,
    field: FilterField,
    value: &str,
    color: bool,
) -> Option<String> {
    match filters.set(field, value).await {
        Ok(RefreshOutcome::Applied(_) | RefreshOutcome::Unchanged) => {
            Some(render_list(&store.snapshot(), color))
        }
        Ok(RefreshOutcome::Superseded) => None,
        Err(err) => Some(err.to_string()),
    }
}

async fn fill_and_submit(form: &TicketForm) -> AppResult<()> {
    let draft = form.draft();
    if !draft.is_empty() {
        println!("Continuing the previous draft.");
    }

    if let Some(title) = ask("Title", Some(&draft.title))?.into_text() {
        form.set_title(&title);
    }
    if let Some(description) = ask("Description", Some(&draft.description))?.into_text() {
        form.set_description(&description);
    }

    println!("Suggesting category & priority...");
    form.on_description_blur().await;

    let draft = form.draft();
    let category = draft.category.map(|c| c.as_str()).unwrap_or_default();
    if let Some(value) = ask("Category", Some(category))?.into_text() {
        match parse_category(&value) {
            _ if value.is_empty() => form.set_category(None),
            Ok(category) => form.set_category(Some(category)),
            Err(message) => println!("{message}"),
        }
    }
    let priority = draft.priority.map(|p| p.as_str()).unwrap_or_default();
    if let Some(value) = ask("Priority", Some(priority))?.into_text() {
        match parse_priority(&value) {
            _ if value.is_empty() => form.set_priority(None),
            Ok(priority) => form.set_priority(Some(priority)),
            Err(message) => println!("{message}"),
        }
    }

    match form.submit().await {
        SubmitOutcome::Created(ticket) => {
            println!("Ticket {} created.", ticket.id);
        }
        _ => {
            if let Some(message) = form.error() {
                println!("{message}");
            }
            println!("Your entries are kept; run 'new' again to correct them.");
        }
    }
    Ok(())
}
