use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Ticket, TicketId};
use crate::error::AppResult;
use crate::services::SupportApi;
use crate::store::TicketStore;
use crate::workflow::filter::FilterController;
use crate::workflow::form::TicketForm;
use crate::workflow::stats::StatsDashboard;
use crate::workflow::status::{AdvanceOutcome, StatusTransitionController};

/// Everything shown on the support page at once. The store is owned here;
/// the controllers only get callbacks into it.
pub struct Session {
    pub store: TicketStore,
    pub filters: FilterController,
    pub transitions: StatusTransitionController,
    pub form: TicketForm,
    pub stats: StatsDashboard,
}

impl Session {
    pub fn new(api: Arc<dyn SupportApi>, search_debounce: Duration) -> Self {
        let store = TicketStore::new();
        let stats = StatsDashboard::new(api.clone());

        let on_loaded = {
            let store = store.clone();
            Arc::new(move |tickets: Vec<Ticket>| store.replace_all(tickets))
        };
        let on_updated = {
            let store = store.clone();
            Arc::new(move |ticket: Ticket| {
                store.replace_by_id(ticket);
            })
        };
        let on_created = {
            let store = store.clone();
            let stats = stats.clone();
            Arc::new(move |ticket: Ticket| {
                store.prepend(ticket);
                stats.bump();
            })
        };

        Self {
            filters: FilterController::new(api.clone(), on_loaded, search_debounce),
            transitions: StatusTransitionController::new(api.clone(), on_updated),
            form: TicketForm::new(api, on_created),
            store,
            stats,
        }
    }

    /// Advances a displayed ticket. `None` when the id is not on screen.
    pub async fn advance(&self, id: &TicketId) -> AppResult<Option<AdvanceOutcome>> {
        let Some(ticket) = self.store.get(id) else {
            return Ok(None);
        };
        self.transitions.advance(&ticket).await.map(Some)
    }
}
