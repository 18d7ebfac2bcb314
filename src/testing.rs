//! In-memory `SupportApi` used by unit tests. Responses are queued per
//! operation and popped when the call is made; an optional gate holds a
//! call open until the test releases it.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::domain::{
    Category, ClassificationSuggestion, FilterSet, NewTicket, Priority, StatsSnapshot, Status,
    Ticket, TicketId, TicketUpdate,
};
use crate::error::{AppError, AppResult};
use crate::services::{CreateOutcome, SupportApi};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(FilterSet),
    Create(NewTicket),
    Update(TicketId, TicketUpdate),
    Classify(String),
    Stats,
}

#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<Call>>,
    lists: Mutex<VecDeque<AppResult<Vec<Ticket>>>>,
    creates: Mutex<VecDeque<AppResult<CreateOutcome>>>,
    updates: Mutex<VecDeque<AppResult<Ticket>>>,
    classifications: Mutex<VecDeque<AppResult<ClassificationSuggestion>>>,
    stats: Mutex<VecDeque<AppResult<StatsSnapshot>>>,
    gates: Mutex<HashMap<&'static str, VecDeque<oneshot::Receiver<()>>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn push_list(&self, result: AppResult<Vec<Ticket>>) {
        self.lists.lock().push_back(result);
    }

    pub fn push_create(&self, result: AppResult<CreateOutcome>) {
        self.creates.lock().push_back(result);
    }

    pub fn push_update(&self, result: AppResult<Ticket>) {
        self.updates.lock().push_back(result);
    }

    pub fn push_classification(&self, result: AppResult<ClassificationSuggestion>) {
        self.classifications.lock().push_back(result);
    }

    pub fn push_stats(&self, result: AppResult<StatsSnapshot>) {
        self.stats.lock().push_back(result);
    }

    /// Holds the next call of `operation` until the returned sender fires.
    pub fn gate(&self, operation: &'static str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().entry(operation).or_default().push_back(rx);
        tx
    }

    async fn wait_gate(&self, operation: &'static str) {
        let gate = self
            .gates
            .lock()
            .get_mut(operation)
            .and_then(|queue| queue.pop_front());
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }
}

#[async_trait]
impl SupportApi for FakeApi {
    async fn list_tickets(&self, filters: &FilterSet) -> AppResult<Vec<Ticket>> {
        self.calls.lock().push(Call::List(filters.clone()));
        let result = self.lists.lock().pop_front().unwrap_or(Ok(Vec::new()));
        self.wait_gate("list").await;
        result
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> AppResult<CreateOutcome> {
        self.calls.lock().push(Call::Create(ticket.clone()));
        let result = self
            .creates
            .lock()
            .pop_front()
            .unwrap_or(Ok(CreateOutcome::Rejected(Default::default())));
        self.wait_gate("create").await;
        result
    }

    async fn update_ticket(&self, id: &TicketId, update: &TicketUpdate) -> AppResult<Ticket> {
        self.calls.lock().push(Call::Update(id.clone(), update.clone()));
        let result = self
            .updates
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Transport("no update queued".to_string())));
        self.wait_gate("update").await;
        result
    }

    async fn classify_ticket(&self, description: &str) -> AppResult<ClassificationSuggestion> {
        self.calls.lock().push(Call::Classify(description.to_string()));
        let result = self
            .classifications
            .lock()
            .pop_front()
            .unwrap_or(Ok(ClassificationSuggestion::default()));
        self.wait_gate("classify").await;
        result
    }

    async fn get_stats(&self) -> AppResult<StatsSnapshot> {
        self.calls.lock().push(Call::Stats);
        let result = self
            .stats
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Transport("no stats queued".to_string())));
        self.wait_gate("stats").await;
        result
    }
}

pub fn ticket(id: u64, status: Status) -> Ticket {
    Ticket {
        id: TicketId::from(id),
        title: format!("Ticket {id}"),
        description: format!("Description for ticket {id}"),
        category: Category::General,
        priority: Priority::Medium,
        status,
        created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
    }
}

pub fn stats(total: u64, open: u64) -> StatsSnapshot {
    StatsSnapshot {
        total_tickets: total,
        open_tickets: open,
        avg_tickets_per_day: 1.5,
        priority_breakdown: [("high".to_string(), total)].into_iter().collect(),
        category_breakdown: [("general".to_string(), total)].into_iter().collect(),
    }
}
