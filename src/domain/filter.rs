use crate::domain::ticket::{Category, Priority, Status};

/// The four independent list constraints. `None` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Category,
    Priority,
    Status,
    Search,
}

impl FilterField {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "category" => Some(FilterField::Category),
            "priority" => Some(FilterField::Priority),
            "status" => Some(FilterField::Status),
            "search" => Some(FilterField::Search),
            _ => None,
        }
    }
}

impl FilterSet {
    /// Query parameters for the list endpoint. Empty fields are omitted
    /// rather than sent as empty strings.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = self.category {
            pairs.push(("category", category.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.as_str().to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }

    /// Sets one field from user text; an empty value clears it.
    /// Returns `false` when the value is not valid for the field.
    pub fn set(&mut self, field: FilterField, value: &str) -> bool {
        let value = value.trim();
        match field {
            FilterField::Category => parse_into(&mut self.category, value, Category::from_str),
            FilterField::Priority => parse_into(&mut self.priority, value, Priority::from_str),
            FilterField::Status => parse_into(&mut self.status, value, Status::from_str),
            FilterField::Search => {
                self.search = (!value.is_empty()).then(|| value.to_string());
                true
            }
        }
    }
}

fn parse_into<T>(slot: &mut Option<T>, value: &str, parse: fn(&str) -> Option<T>) -> bool {
    if value.is_empty() {
        *slot = None;
        return true;
    }
    match parse(value) {
        Some(parsed) => {
            *slot = Some(parsed);
            true
        }
        None => false,
    }
}
