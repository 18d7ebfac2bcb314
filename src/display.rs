use std::fmt::Write as _;

use owo_colors::OwoColorize;

use crate::domain::ticket::truncate_chars;
use crate::domain::{Priority, StatsSnapshot, Ticket};

const DESCRIPTION_PREVIEW_CHARS: usize = 120;

pub fn description_preview(description: &str) -> String {
    let preview = truncate_chars(description, DESCRIPTION_PREVIEW_CHARS);
    if preview.len() < description.len() {
        format!("{preview}…")
    } else {
        preview.to_string()
    }
}

fn priority_badge(priority: Priority, color: bool) -> String {
    let label = format!(" {} ", priority.as_str());
    if !color {
        return format!("[{}]", priority.as_str());
    }
    match priority {
        Priority::Low => label.black().on_green().to_string(),
        Priority::Medium => label.black().on_yellow().to_string(),
        Priority::High => label.white().on_red().to_string(),
        Priority::Critical => label.white().on_magenta().to_string(),
    }
}

pub fn render_card(ticket: &Ticket, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "#{} {} {}",
        ticket.id,
        ticket.title,
        priority_badge(ticket.priority, color)
    );
    let _ = writeln!(out, "    {}", description_preview(&ticket.description));
    let _ = write!(
        out,
        "    {} | {} | {}",
        ticket.category.as_str(),
        ticket.status.label(),
        ticket.created_at.format("%Y-%m-%d")
    );
    if let Some(next) = ticket.status.next() {
        let _ = write!(out, "\n    → Mark as {}", next.label());
    }
    out
}

pub fn render_list(tickets: &[Ticket], color: bool) -> String {
    if tickets.is_empty() {
        return "No tickets found.".to_string();
    }
    tickets
        .iter()
        .map(|ticket| render_card(ticket, color))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_stats(stats: Option<&StatsSnapshot>) -> String {
    let Some(stats) = stats else {
        return "Loading stats...".to_string();
    };

    let mut out = String::from("Dashboard\n");
    let _ = writeln!(out, "  Total Tickets: {}", stats.total_tickets);
    let _ = writeln!(out, "  Open:          {}", stats.open_tickets);
    let _ = writeln!(out, "  Avg / Day:     {}", stats.avg_tickets_per_day);
    out.push_str("By Priority\n");
    for (priority, count) in &stats.priority_breakdown {
        let _ = writeln!(out, "  {priority:<10} {count}");
    }
    out.push_str("By Category\n");
    for (category, count) in &stats.category_breakdown {
        let _ = writeln!(out, "  {category:<10} {count}");
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Status;
    use crate::testing::{stats, ticket};

    #[test]
    fn long_descriptions_are_cut_with_ellipsis() {
        let long = "a".repeat(130);
        let preview = description_preview(&long);
        assert_eq!(preview.chars().count(), 121);
        assert!(preview.ends_with('…'));
        assert_eq!(description_preview("short"), "short");
    }

    #[test]
    fn card_offers_next_step_until_closed() {
        let open = render_card(&ticket(4, Status::InProgress), false);
        assert!(open.contains("#4 Ticket 4 [medium]"));
        assert!(open.contains("general | in progress | 2025-03-01"));
        assert!(open.contains("→ Mark as resolved"));

        let closed = render_card(&ticket(5, Status::Closed), false);
        assert!(!closed.contains("Mark as"));
    }

    #[test]
    fn empty_list_and_missing_stats() {
        assert_eq!(render_list(&[], false), "No tickets found.");
        assert_eq!(render_stats(None), "Loading stats...");
    }

    #[test]
    fn stats_lists_breakdowns() {
        let rendered = render_stats(Some(&stats(3, 1)));
        assert!(rendered.contains("Total Tickets: 3"));
        assert!(rendered.contains("Open:          1"));
        assert!(rendered.contains("high       3"));
    }
}
