pub mod classification;
pub mod filter;
pub mod stats;
pub mod ticket;

pub use classification::ClassificationSuggestion;
pub use filter::{FilterField, FilterSet};
pub use stats::StatsSnapshot;
pub use ticket::{Category, NewTicket, Priority, Status, Ticket, TicketDraft, TicketId, TicketUpdate};
