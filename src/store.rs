use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::{Ticket, TicketId};

/// Ordered list of displayed tickets, newest first. Cloning yields another
/// handle to the same list. Every mutation swaps whole tickets, and no two
/// entries ever share an id.
#[derive(Clone, Default)]
pub struct TicketStore {
    tickets: Arc<RwLock<Vec<Ticket>>>,
}

impl TicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Ticket> {
        self.tickets.read().clone()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tickets.read().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tickets.read().is_empty()
    }

    pub fn get(&self, id: &TicketId) -> Option<Ticket> {
        self.tickets.read().iter().find(|t| &t.id == id).cloned()
    }

    /// Discards the current contents in favour of a freshly fetched list.
    pub fn replace_all(&self, tickets: Vec<Ticket>) {
        let mut deduped: Vec<Ticket> = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            if !deduped.iter().any(|t| t.id == ticket.id) {
                deduped.push(ticket);
            }
        }
        *self.tickets.write() = deduped;
    }

    /// Inserts a newly created ticket at the front. A stale entry with the
    /// same id is dropped first.
    pub fn prepend(&self, ticket: Ticket) {
        let mut tickets = self.tickets.write();
        tickets.retain(|t| t.id != ticket.id);
        tickets.insert(0, ticket);
    }

    /// Swaps in the server's copy of a ticket at its current position.
    /// Returns `false` and leaves the list alone when the id is unknown.
    pub fn replace_by_id(&self, ticket: Ticket) -> bool {
        let mut tickets = self.tickets.write();
        match tickets.iter_mut().find(|t| t.id == ticket.id) {
            Some(slot) => {
                *slot = ticket;
                true
            }
            None => false,
        }
    }
}
