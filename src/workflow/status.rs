use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{Status, Ticket, TicketUpdate};
use crate::error::AppResult;
use crate::services::SupportApi;
use crate::workflow::TicketCallback;

pub const STATUS_UPDATE_FAILED: &str = "Could not update ticket status. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// The server accepted the transition; carries its copy of the ticket.
    Advanced(Ticket),
    /// The ticket is closed, so nothing was sent.
    Terminal,
}

/// Moves tickets one lifecycle step forward, only after the server confirms.
pub struct StatusTransitionController {
    api: Arc<dyn SupportApi>,
    on_updated: TicketCallback,
}

impl StatusTransitionController {
    pub fn new(api: Arc<dyn SupportApi>, on_updated: TicketCallback) -> Self {
        Self { api, on_updated }
    }

    pub fn next_status(ticket: &Ticket) -> Option<Status> {
        ticket.status.next()
    }

    pub async fn advance(&self, ticket: &Ticket) -> AppResult<AdvanceOutcome> {
        let Some(next) = Self::next_status(ticket) else {
            return Ok(AdvanceOutcome::Terminal);
        };

        let updated = self
            .api
            .update_ticket(&ticket.id, &TicketUpdate::status(next))
            .await
            .inspect_err(|err| warn!(ticket = %ticket.id, error = %err, "status update failed"))?;

        info!(
            ticket = %updated.id,
            from = ticket.status.as_str(),
            to = updated.status.as_str(),
            "ticket status advanced"
        );
        (self.on_updated)(updated.clone());
        Ok(AdvanceOutcome::Advanced(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TicketId;
    use crate::error::AppError;
    use crate::store::TicketStore;
    use crate::testing::{Call, FakeApi, ticket};

    fn controller(api: Arc<FakeApi>, store: &TicketStore) -> StatusTransitionController {
        let store = store.clone();
        StatusTransitionController::new(api, Arc::new(move |t: Ticket| {
            store.replace_by_id(t);
        }))
    }

    #[test]
    fn computes_next_status() {
        let next = |status| StatusTransitionController::next_status(&ticket(1, status));
        assert_eq!(next(Status::Open), Some(Status::InProgress));
        assert_eq!(next(Status::InProgress), Some(Status::Resolved));
        assert_eq!(next(Status::Resolved), Some(Status::Closed));
        assert_eq!(next(Status::Closed), None);
    }

    #[tokio::test]
    async fn closed_ticket_issues_no_update() {
        let api = Arc::new(FakeApi::new());
        let store = TicketStore::new();
        let closed = ticket(1, Status::Closed);
        store.replace_all(vec![closed.clone()]);

        let outcome = controller(api.clone(), &store).advance(&closed).await.unwrap();

        assert_eq!(outcome, AdvanceOutcome::Terminal);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn advance_writes_server_copy_into_store() {
        let api = Arc::new(FakeApi::new());
        let store = TicketStore::new();
        store.replace_all(vec![ticket(1, Status::Open), ticket(2, Status::Open)]);
        api.push_update(Ok(ticket(2, Status::InProgress)));

        let outcome = controller(api.clone(), &store)
            .advance(&ticket(2, Status::Open))
            .await
            .unwrap();

        assert!(matches!(outcome, AdvanceOutcome::Advanced(_)));
        assert_eq!(
            api.calls(),
            vec![Call::Update(
                TicketId::from(2),
                TicketUpdate::status(Status::InProgress)
            )]
        );
        assert_eq!(store.snapshot()[1].status, Status::InProgress);
    }

    #[tokio::test]
    async fn failed_update_keeps_displayed_status() {
        let api = Arc::new(FakeApi::new());
        let store = TicketStore::new();
        store.replace_all(vec![ticket(1, Status::Resolved)]);
        api.push_update(Err(AppError::Transport("connection reset".to_string())));

        let result = controller(api, &store)
            .advance(&ticket(1, Status::Resolved))
            .await;

        assert!(matches!(result, Err(AppError::Transport(_))));
        assert_eq!(store.snapshot()[0].status, Status::Resolved);
    }
}
