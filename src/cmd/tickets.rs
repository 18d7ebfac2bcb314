use std::io::IsTerminal;
use std::time::Duration;

use clap::Args;

use crate::context::AppContext;
use crate::display::{render_card, render_list, render_stats};
use crate::domain::{Category, FilterSet, Priority, Status, TicketDraft, TicketId};
use crate::drafts::DraftStore;
use crate::error::{AppError, AppResult};
use crate::workflow::form::{NETWORK_ERROR, SubmitOutcome};
use crate::workflow::session::Session;
use crate::workflow::status::{AdvanceOutcome, STATUS_UPDATE_FAILED};

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long, value_parser = parse_category)]
    pub category: Option<Category>,
    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<Priority>,
    #[arg(long, value_parser = parse_status)]
    pub status: Option<Status>,
    /// Match against title and description.
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Overrides the suggested category.
    #[arg(long, value_parser = parse_category)]
    pub category: Option<Category>,
    /// Overrides the suggested priority.
    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<Priority>,
    /// Skip the category/priority suggestion.
    #[arg(long)]
    pub no_classify: bool,
    /// Fill unspecified fields from the last unsubmitted draft.
    #[arg(long)]
    pub resume: bool,
}

pub fn parse_category(value: &str) -> Result<Category, String> {
    Category::from_str(value).ok_or_else(|| {
        format!("expected one of: {}", join_labels(Category::ALL.map(|c| c.as_str())))
    })
}

pub fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::from_str(value).ok_or_else(|| {
        format!("expected one of: {}", join_labels(Priority::ALL.map(|p| p.as_str())))
    })
}

pub fn parse_status(value: &str) -> Result<Status, String> {
    Status::from_str(value).ok_or_else(|| {
        format!("expected one of: {}", join_labels(Status::ALL.map(|s| s.as_str())))
    })
}

fn join_labels<const N: usize>(labels: [&str; N]) -> String {
    labels.join(", ")
}

pub fn use_color() -> bool {
    std::io::stdout().is_terminal()
}

fn session(ctx: &AppContext) -> Session {
    // One-shot commands await each step, so debouncing would only add latency.
    Session::new(ctx.api.clone(), Duration::ZERO)
}

pub async fn list(ctx: &AppContext, args: ListArgs) -> AppResult<()> {
    let session = session(ctx);
    let filters = FilterSet {
        category: args.category,
        priority: args.priority,
        status: args.status,
        search: args.search.filter(|s| !s.trim().is_empty()),
    };
    session.filters.replace(filters).await?;
    println!("{}", render_list(&session.store.snapshot(), use_color()));
    Ok(())
}

pub async fn create(ctx: &AppContext, args: CreateArgs) -> AppResult<()> {
    let session = session(ctx);
    let form = &session.form;
    let mut drafts = DraftStore::load()?;

    let mut explicit = TicketDraft {
        title: args.title.unwrap_or_default(),
        description: args.description.unwrap_or_default(),
        category: args.category,
        priority: args.priority,
    };
    if args.resume {
        drafts.fill_missing(&mut explicit);
    }

    form.restore(explicit.clone());

    if !args.no_classify {
        if let Some(suggestion) = form.on_description_blur().await {
            if let Some(category) = suggestion.suggested_category {
                println!("Suggested category: {}", category.as_str());
            }
            if let Some(priority) = suggestion.suggested_priority {
                println!("Suggested priority: {}", priority.as_str());
            }
        }
        // Values the user typed win over the suggestion.
        if explicit.category.is_some() {
            form.set_category(explicit.category);
        }
        if explicit.priority.is_some() {
            form.set_priority(explicit.priority);
        }
    }

    let outcome = form.submit().await;
    let message = form.error().unwrap_or_default();
    match outcome {
        SubmitOutcome::Created(ticket) => {
            drafts.clear();
            drafts.save()?;
            println!("Ticket {} created.", ticket.id);
            println!("{}", render_card(&ticket, use_color()));
            Ok(())
        }
        SubmitOutcome::Rejected(errors) => {
            drafts.retain(&form.draft());
            drafts.save()?;
            let details = errors
                .iter()
                .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
                .collect::<Vec<_>>()
                .join("; ");
            Err(AppError::InvalidInput(if details.is_empty() {
                message
            } else {
                format!("{message} ({details})")
            }))
        }
        SubmitOutcome::Incomplete => {
            drafts.retain(&form.draft());
            drafts.save()?;
            Err(AppError::InvalidInput(message))
        }
        SubmitOutcome::Failed => {
            drafts.retain(&form.draft());
            drafts.save()?;
            Err(AppError::Transport(NETWORK_ERROR.to_string()))
        }
        SubmitOutcome::Busy => Err(AppError::InvalidInput(
            "the form is still busy with another request".to_string(),
        )),
    }
}

pub async fn advance(ctx: &AppContext, id: String) -> AppResult<()> {
    let session = session(ctx);
    session.filters.refresh().await?;
    let id = TicketId::new(id.trim());

    match session.advance(&id).await {
        Ok(Some(AdvanceOutcome::Advanced(ticket))) => {
            println!("Ticket {} is now {}.", ticket.id, ticket.status.label());
            println!("{}", render_card(&ticket, use_color()));
            Ok(())
        }
        Ok(Some(AdvanceOutcome::Terminal)) => {
            println!("Ticket {id} is closed; there is no further status.");
            Ok(())
        }
        Ok(None) => Err(AppError::InvalidInput(format!("no ticket with id {id}"))),
        Err(err) => Err(AppError::Transport(format!("{STATUS_UPDATE_FAILED} ({err})"))),
    }
}

pub async fn classify(ctx: &AppContext, description: String) -> AppResult<()> {
    if description.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "description must not be empty".to_string(),
        ));
    }
    let suggestion = ctx.api.classify_ticket(&description).await?;
    if suggestion.is_empty() {
        println!("No confident suggestion.");
        return Ok(());
    }
    let label = |value: Option<&'static str>| value.unwrap_or("<no suggestion>");
    println!(
        "Category: {}",
        label(suggestion.suggested_category.map(|c| c.as_str()))
    );
    println!(
        "Priority: {}",
        label(suggestion.suggested_priority.map(|p| p.as_str()))
    );
    Ok(())
}

pub async fn stats(ctx: &AppContext) -> AppResult<()> {
    let session = session(ctx);
    let snapshot = session.stats.load().await?;
    println!("{}", render_stats(Some(&snapshot)));
    Ok(())
}
