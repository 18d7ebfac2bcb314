use std::io::{self, Write};

use crate::error::AppResult;

/// One answer at a field prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Keep,
    Clear,
    Set(String),
}

impl Edit {
    /// Enter keeps the current value, `-` clears it, anything else replaces it.
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "" => Edit::Keep,
            "-" => Edit::Clear,
            value => Edit::Set(value.to_string()),
        }
    }

    pub fn apply(self, target: &mut Option<String>) {
        match self {
            Edit::Keep => {}
            Edit::Clear => *target = None,
            Edit::Set(value) => *target = Some(value),
        }
    }

    /// The new text for a form field, or `None` to leave it alone. Clearing
    /// yields an empty string.
    pub fn into_text(self) -> Option<String> {
        match self {
            Edit::Keep => None,
            Edit::Clear => Some(String::new()),
            Edit::Set(value) => Some(value),
        }
    }
}

fn field_label(field: &str, current: Option<&str>) -> String {
    match current.filter(|value| !value.is_empty()) {
        Some(value) => format!("{field} [{value}] (Enter to keep, '-' to clear): "),
        None => format!("{field} (Enter to skip): "),
    }
}

/// Prints `label` and reads one line. `None` once stdin is closed.
pub fn read_line(label: &str) -> AppResult<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "{label}")?;
    stdout.flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input))
}

/// Asks for one field. A closed stdin keeps the current value.
pub fn ask(field: &str, current: Option<&str>) -> AppResult<Edit> {
    Ok(read_line(&field_label(field, current))?
        .map(|input| Edit::parse(&input))
        .unwrap_or(Edit::Keep))
}

pub fn display_value(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("<not set>")
}
