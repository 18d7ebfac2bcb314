use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::{
    ClassificationSuggestion, FilterSet, NewTicket, StatsSnapshot, Ticket, TicketId, TicketUpdate,
};
use crate::error::AppResult;

/// Field name to messages, as reported by the backend when it refuses a ticket.
pub type ValidationErrors = BTreeMap<String, Vec<String>>;

/// A create call either yields the stored ticket or a business-level refusal.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created(Ticket),
    Rejected(ValidationErrors),
}

/// One network round trip per call. No caching, retries or de-duplication.
#[async_trait]
pub trait SupportApi: Send + Sync {
    async fn list_tickets(&self, filters: &FilterSet) -> AppResult<Vec<Ticket>>;
    async fn create_ticket(&self, ticket: &NewTicket) -> AppResult<CreateOutcome>;
    async fn update_ticket(&self, id: &TicketId, update: &TicketUpdate) -> AppResult<Ticket>;
    async fn classify_ticket(&self, description: &str) -> AppResult<ClassificationSuggestion>;
    async fn get_stats(&self) -> AppResult<StatsSnapshot>;
}
