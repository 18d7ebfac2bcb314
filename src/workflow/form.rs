use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::domain::ticket::{TITLE_MAX_CHARS, truncate_chars};
use crate::domain::{Category, ClassificationSuggestion, Priority, Ticket, TicketDraft};
use crate::services::{CreateOutcome, SupportApi, ValidationErrors};
use crate::workflow::TicketCallback;

pub const FIELDS_REQUIRED: &str = "All fields are required.";
pub const CREATE_REJECTED: &str = "Failed to create ticket. Check all fields.";
pub const NETWORK_ERROR: &str = "Network error. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(Ticket),
    /// A required field is empty; nothing was sent.
    Incomplete,
    Rejected(ValidationErrors),
    /// Transport failure; the draft is kept.
    Failed,
    /// A submission or classification is still in flight.
    Busy,
}

#[derive(Default)]
struct FormState {
    draft: TicketDraft,
    classifying: usize,
    submitting: bool,
    error: Option<String>,
}

/// The new-ticket form: draft fields, the classify-on-blur suggestion, and
/// submission. Clones share the same form.
#[derive(Clone)]
pub struct TicketForm {
    api: Arc<dyn SupportApi>,
    on_created: TicketCallback,
    state: Arc<RwLock<FormState>>,
    classify_seq: Arc<AtomicU64>,
}

impl TicketForm {
    pub fn new(api: Arc<dyn SupportApi>, on_created: TicketCallback) -> Self {
        Self {
            api,
            on_created,
            state: Arc::default(),
            classify_seq: Arc::default(),
        }
    }

    pub fn draft(&self) -> TicketDraft {
        self.state.read().draft.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn is_classifying(&self) -> bool {
        self.state.read().classifying > 0
    }

    pub fn can_submit(&self) -> bool {
        let state = self.state.read();
        state.classifying == 0 && !state.submitting
    }

    pub fn set_title(&self, title: &str) {
        self.state.write().draft.title = truncate_chars(title, TITLE_MAX_CHARS).to_string();
    }

    pub fn set_description(&self, description: &str) {
        self.state.write().draft.description = description.to_string();
    }

    pub fn set_category(&self, category: Option<Category>) {
        self.state.write().draft.category = category;
    }

    pub fn set_priority(&self, priority: Option<Priority>) {
        self.state.write().draft.priority = priority;
    }

    /// Loads a previously retained draft into the form.
    pub fn restore(&self, mut draft: TicketDraft) {
        draft.title = truncate_chars(&draft.title, TITLE_MAX_CHARS).to_string();
        self.state.write().draft = draft;
    }

    /// Description lost focus. Asks the backend for a category/priority
    /// suggestion and merges it into the draft. Failures are logged and
    /// otherwise ignored. When blurs overlap, only the latest one's answer
    /// is merged. Returns the suggestion that was applied, if any.
    pub async fn on_description_blur(&self) -> Option<ClassificationSuggestion> {
        let description = self.state.read().draft.description.clone();
        if description.trim().is_empty() {
            return None;
        }

        let seq = self.classify_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().classifying += 1;
        let result = self.api.classify_ticket(&description).await;
        let mut state = self.state.write();
        state.classifying -= 1;

        match result {
            Ok(suggestion) if seq == self.classify_seq.load(Ordering::SeqCst) => {
                debug!(?suggestion, "applying classification suggestion");
                suggestion.merge_into(&mut state.draft);
                Some(suggestion)
            }
            Ok(_) => {
                debug!(seq, "dropping superseded classification suggestion");
                None
            }
            Err(err) => {
                warn!(error = %err, "classification failed; leaving form untouched");
                None
            }
        }
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let new_ticket = {
            let mut state = self.state.write();
            if state.submitting || state.classifying > 0 {
                return SubmitOutcome::Busy;
            }
            let Some(new_ticket) = state.draft.to_new_ticket() else {
                state.error = Some(FIELDS_REQUIRED.to_string());
                return SubmitOutcome::Incomplete;
            };
            state.submitting = true;
            state.error = None;
            new_ticket
        };

        let result = self.api.create_ticket(&new_ticket).await;

        let outcome = {
            let mut state = self.state.write();
            state.submitting = false;
            match result {
                Ok(CreateOutcome::Created(ticket)) => {
                    state.draft = TicketDraft::default();
                    SubmitOutcome::Created(ticket)
                }
                Ok(CreateOutcome::Rejected(errors)) => {
                    warn!(?errors, "ticket rejected by server");
                    state.error = Some(CREATE_REJECTED.to_string());
                    SubmitOutcome::Rejected(errors)
                }
                Err(err) => {
                    warn!(error = %err, "ticket submission failed");
                    state.error = Some(NETWORK_ERROR.to_string());
                    SubmitOutcome::Failed
                }
            }
        };

        if let SubmitOutcome::Created(ticket) = &outcome {
            info!(ticket = %ticket.id, "ticket created");
            (self.on_created)(ticket.clone());
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewTicket, Status, TicketId};
    use crate::error::AppError;
    use crate::store::TicketStore;
    use crate::testing::{Call, FakeApi, ticket};

    fn form_with_store(api: Arc<FakeApi>) -> (TicketForm, TicketStore) {
        let store = TicketStore::new();
        let sink = store.clone();
        let form = TicketForm::new(api, Arc::new(move |t: Ticket| sink.prepend(t)));
        (form, store)
    }

    fn fill_login_draft(form: &TicketForm) {
        form.set_title("Login fails");
        form.set_description("Cannot log in since yesterday");
        form.set_category(Some(Category::Technical));
        form.set_priority(Some(Priority::High));
    }

    #[tokio::test]
    async fn blank_description_skips_classification() {
        let api = Arc::new(FakeApi::new());
        let (form, _) = form_with_store(api.clone());
        form.set_description("   \n");

        assert!(form.on_description_blur().await.is_none());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn suggestion_fills_only_suggested_fields() {
        let api = Arc::new(FakeApi::new());
        let (form, _) = form_with_store(api.clone());
        form.set_description("I was charged twice");
        form.set_priority(Some(Priority::High));
        api.push_classification(Ok(ClassificationSuggestion {
            suggested_category: Some(Category::Billing),
            suggested_priority: None,
        }));

        form.on_description_blur().await;

        let draft = form.draft();
        assert_eq!(draft.category, Some(Category::Billing));
        assert_eq!(draft.priority, Some(Priority::High));
        assert_eq!(
            api.calls(),
            vec![Call::Classify("I was charged twice".to_string())]
        );
    }

    #[tokio::test]
    async fn classification_failure_is_silent() {
        let api = Arc::new(FakeApi::new());
        let (form, _) = form_with_store(api.clone());
        fill_login_draft(&form);
        let before = form.draft();
        api.push_classification(Err(AppError::Transport("timeout".to_string())));

        assert!(form.on_description_blur().await.is_none());

        assert_eq!(form.draft(), before);
        assert_eq!(form.error(), None);
        assert!(!form.is_classifying());
    }

    #[tokio::test]
    async fn classifying_blocks_submission_until_done() {
        let api = Arc::new(FakeApi::new());
        let (form, _) = form_with_store(api.clone());
        fill_login_draft(&form);
        let release = api.gate("classify");

        let pending = tokio::spawn({
            let form = form.clone();
            async move { form.on_description_blur().await }
        });
        while !form.is_classifying() {
            tokio::task::yield_now().await;
        }

        assert!(!form.can_submit());
        assert_eq!(form.submit().await, SubmitOutcome::Busy);

        release.send(()).unwrap();
        pending.await.unwrap();
        assert!(form.can_submit());
    }

    #[tokio::test]
    async fn superseded_suggestion_is_dropped() {
        let api = Arc::new(FakeApi::new());
        let (form, _) = form_with_store(api.clone());
        form.set_description("Refund please");
        api.push_classification(Ok(ClassificationSuggestion {
            suggested_category: Some(Category::Account),
            suggested_priority: Some(Priority::Low),
        }));
        api.push_classification(Ok(ClassificationSuggestion {
            suggested_category: Some(Category::Billing),
            suggested_priority: None,
        }));
        let release_first = api.gate("classify");

        let first = tokio::spawn({
            let form = form.clone();
            async move { form.on_description_blur().await }
        });
        while !form.is_classifying() {
            tokio::task::yield_now().await;
        }
        let second = form.on_description_blur().await;
        release_first.send(()).unwrap();
        let first = first.await.unwrap();

        assert!(second.is_some());
        assert!(first.is_none());
        assert_eq!(form.draft().category, Some(Category::Billing));
        assert_eq!(form.draft().priority, None);
    }

    #[tokio::test]
    async fn missing_fields_are_reported_locally() {
        let api = Arc::new(FakeApi::new());
        let (form, _) = form_with_store(api.clone());
        form.set_title("Only a title");

        assert_eq!(form.submit().await, SubmitOutcome::Incomplete);
        assert_eq!(form.error().as_deref(), Some(FIELDS_REQUIRED));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn successful_submit_prepends_and_resets() {
        let api = Arc::new(FakeApi::new());
        let (form, store) = form_with_store(api.clone());
        store.replace_all(vec![ticket(1, Status::Open)]);
        fill_login_draft(&form);
        let mut created = ticket(2, Status::Open);
        created.title = "Login fails".to_string();
        api.push_create(Ok(CreateOutcome::Created(created.clone())));

        let outcome = form.submit().await;

        assert_eq!(outcome, SubmitOutcome::Created(created.clone()));
        assert_eq!(store.len(), 2);
        assert_eq!(store.snapshot()[0], created);
        assert!(form.draft().is_empty());
        assert_eq!(
            api.calls(),
            vec![Call::Create(NewTicket {
                title: "Login fails".to_string(),
                description: "Cannot log in since yesterday".to_string(),
                category: Category::Technical,
                priority: Priority::High,
            })]
        );
    }

    #[tokio::test]
    async fn rejected_submit_keeps_draft_and_store() {
        let api = Arc::new(FakeApi::new());
        let (form, store) = form_with_store(api.clone());
        store.replace_all(vec![ticket(1, Status::Open)]);
        fill_login_draft(&form);
        let before = form.draft();
        api.push_create(Ok(CreateOutcome::Rejected(ValidationErrors::new())));

        let outcome = form.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
        assert_eq!(form.error().as_deref(), Some(CREATE_REJECTED));
        assert_eq!(form.draft(), before);
        assert_eq!(store.snapshot(), vec![ticket(1, Status::Open)]);
        assert!(store.get(&TicketId::from(2)).is_none());
    }

    #[tokio::test]
    async fn transport_failure_reports_network_error() {
        let api = Arc::new(FakeApi::new());
        let (form, store) = form_with_store(api.clone());
        fill_login_draft(&form);
        api.push_create(Err(AppError::Transport("refused".to_string())));

        assert_eq!(form.submit().await, SubmitOutcome::Failed);
        assert_eq!(form.error().as_deref(), Some(NETWORK_ERROR));
        assert!(!form.draft().is_empty());
        assert!(store.is_empty());
        assert!(form.can_submit());
    }

    #[test]
    fn title_is_bounded() {
        let form = TicketForm::new(Arc::new(FakeApi::new()), Arc::new(|_: Ticket| {}));
        form.set_title(&"x".repeat(250));
        assert_eq!(form.draft().title.chars().count(), TITLE_MAX_CHARS);
    }

    #[tokio::test]
    async fn restored_draft_is_bounded_and_submittable() {
        let api = Arc::new(FakeApi::new());
        let (form, _) = form_with_store(api.clone());
        form.set_title("Stale title");
        let retained = TicketDraft {
            title: "t".repeat(230),
            description: "Charged twice".to_string(),
            category: Some(Category::Billing),
            priority: Some(Priority::Medium),
        };

        form.restore(retained);

        let draft = form.draft();
        assert_eq!(draft.title, "t".repeat(TITLE_MAX_CHARS));
        assert_eq!(draft.category, Some(Category::Billing));
        assert_eq!(form.submit().await, SubmitOutcome::Rejected(ValidationErrors::new()));
        assert_eq!(
            api.calls(),
            vec![Call::Create(NewTicket {
                title: "t".repeat(TITLE_MAX_CHARS),
                description: "Charged twice".to_string(),
                category: Category::Billing,
                priority: Priority::Medium,
            })]
        );
    }
}
