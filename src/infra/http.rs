use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Method, Request, Response, StatusCode,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::domain::{
    ClassificationSuggestion, FilterSet, NewTicket, StatsSnapshot, Ticket, TicketId, TicketUpdate,
};
use crate::error::{AppError, AppResult};
use crate::services::{CreateOutcome, SupportApi, ValidationErrors};

/// REST client for the ticket backend rooted at `{base_url}/api/tickets/`.
pub struct HttpSupportApi {
    http: Client,
    base_url: String,
}

impl HttpSupportApi {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/tickets/{path}", self.base_url)
    }

    fn ticket_endpoint(&self, id: &TicketId) -> String {
        self.endpoint(&format!("{id}/"))
    }

    fn list_request(&self, filters: &FilterSet) -> AppResult<Request> {
        let pairs = filters.query_pairs();
        let mut builder = self
            .http
            .get(self.endpoint(""))
            .header(ACCEPT, "application/json");
        if !pairs.is_empty() {
            builder = builder.query(&pairs);
        }
        Ok(builder.build()?)
    }

    fn json_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: String,
        body: &B,
    ) -> AppResult<Request> {
        Ok(self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .build()?)
    }

    async fn send(&self, request: Request) -> AppResult<Response> {
        debug!(method = %request.method(), url = %request.url(), "sending request");
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|err| AppError::Transport(format!("failed to reach the support API: {err}")))?;
        debug!(status = %response.status(), "received response");
        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: Request) -> AppResult<T> {
        let response = self.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::Transport(format!(
                "support API responded with {status}: {body}"
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::Transport(format!("failed to parse response: {err}")))
    }
}

#[async_trait]
impl SupportApi for HttpSupportApi {
    async fn list_tickets(&self, filters: &FilterSet) -> AppResult<Vec<Ticket>> {
        let request = self.list_request(filters)?;
        self.fetch(request).await
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> AppResult<CreateOutcome> {
        let request = self.json_request(Method::POST, self.endpoint(""), ticket)?;
        let response = self.send(request).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AppError::Transport(format!("failed to read response: {err}")))?;
        interpret_create_response(status, &body)
    }

    async fn update_ticket(&self, id: &TicketId, update: &TicketUpdate) -> AppResult<Ticket> {
        let request = self.json_request(Method::PATCH, self.ticket_endpoint(id), update)?;
        self.fetch(request).await
    }

    async fn classify_ticket(&self, description: &str) -> AppResult<ClassificationSuggestion> {
        let body = ClassifyRequest { description };
        let request = self.json_request(Method::POST, self.endpoint("classify/"), &body)?;
        self.fetch(request).await
    }

    async fn get_stats(&self) -> AppResult<StatsSnapshot> {
        let request = self
            .http
            .get(self.endpoint("stats/"))
            .header(ACCEPT, "application/json")
            .build()?;
        self.fetch(request).await
    }
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    description: &'a str,
}

/// A JSON object carrying an `id` is the created ticket; any other object is
/// a validation refusal. Server faults and non-object bodies are transport
/// failures.
fn interpret_create_response(status: StatusCode, body: &str) -> AppResult<CreateOutcome> {
    if status.is_server_error() {
        return Err(AppError::Transport(format!(
            "support API responded with {status}: {body}"
        )));
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|err| AppError::Transport(format!("failed to parse response: {err}")))?;
    let Value::Object(fields) = value else {
        return Err(AppError::Transport(
            "support API returned a non-object create response".to_string(),
        ));
    };

    if fields.get("id").is_some_and(|id| !id.is_null()) {
        let ticket = serde_json::from_value::<Ticket>(Value::Object(fields))
            .map_err(|err| AppError::Transport(format!("malformed ticket in response: {err}")))?;
        return Ok(CreateOutcome::Created(ticket));
    }

    let errors: ValidationErrors = fields
        .into_iter()
        .map(|(field, messages)| (field, flatten_messages(messages)))
        .collect();
    Ok(CreateOutcome::Rejected(errors))
}

fn flatten_messages(value: Value) -> Vec<String> {
    match value {
        Value::String(message) => vec![message],
        Value::Array(items) => items.into_iter().flat_map(flatten_messages).collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}
