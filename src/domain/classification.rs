use serde::Deserialize;

use crate::domain::ticket::{Category, Priority, TicketDraft};

/// Advisory result of the classify endpoint. A missing field means the
/// server had no confident suggestion for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClassificationSuggestion {
    #[serde(default, deserialize_with = "lenient::category")]
    pub suggested_category: Option<Category>,
    #[serde(default, deserialize_with = "lenient::priority")]
    pub suggested_priority: Option<Priority>,
}

impl ClassificationSuggestion {
    pub fn is_empty(&self) -> bool {
        self.suggested_category.is_none() && self.suggested_priority.is_none()
    }

    /// Each suggested field replaces the draft's value; absent ones leave it alone.
    pub fn merge_into(&self, draft: &mut TicketDraft) {
        if let Some(category) = self.suggested_category {
            draft.category = Some(category);
        }
        if let Some(priority) = self.suggested_priority {
            draft.priority = Some(priority);
        }
    }
}

// The backend answers `null` or an unrecognised label when unsure; both
// are treated as "no suggestion" instead of failing the whole response.
mod lenient {
    use serde::{Deserialize, Deserializer};

    use crate::domain::ticket::{Category, Priority};

    pub fn category<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Category>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.as_deref().and_then(Category::from_str))
    }

    pub fn priority<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Priority>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.as_deref().and_then(Priority::from_str))
    }
}
