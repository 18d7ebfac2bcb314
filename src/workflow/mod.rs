pub mod filter;
pub mod form;
pub mod session;
pub mod stats;
pub mod status;

use std::sync::Arc;

use crate::domain::Ticket;

/// Receives a single ticket confirmed by the server.
pub type TicketCallback = Arc<dyn Fn(Ticket) + Send + Sync>;
/// Receives a complete freshly fetched list.
pub type TicketListCallback = Arc<dyn Fn(Vec<Ticket>) + Send + Sync>;
