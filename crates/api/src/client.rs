//! HTTP client for the budget REST service.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use budgetdesk_core::budgets::{Budget, BudgetRepositoryTrait, CreatedId, NewBudget};
use budgetdesk_core::errors::{Error, Result};
use budgetdesk_core::records::{BudgetRecord, BudgetRecordRepositoryTrait, NewBudgetRecord};
use budgetdesk_core::users::{UserInfo, UserRepositoryTrait};

/// Default base URL of the budget service.
pub const DEFAULT_API_URL: &str = "http://localhost:5259";

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of body characters quoted in an error message.
const ERROR_BODY_PREVIEW: usize = 200;

// ─────────────────────────────────────────────────────────────────────────────
// API Response Types (internal)
// ─────────────────────────────────────────────────────────────────────────────

/// ProblemDetails-style error body.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiErrorResponse {
    fn into_message(self) -> Option<String> {
        self.detail
            .or(self.title)
            .or(self.message)
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}

/// Create endpoints answer `{ "id": n }`; older builds answer a bare number.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum ApiCreatedResponse {
    Object(CreatedId),
    Bare(i64),
}

impl ApiCreatedResponse {
    fn id(&self) -> i64 {
        match self {
            ApiCreatedResponse::Object(created) => created.id,
            ApiCreatedResponse::Bare(id) => *id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client configuration
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Budget API Client
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP client for the budget service.
///
/// One instance keeps one cookie jar, so the session cookie set at sign-in is
/// sent with every later request.
///
/// # Example
///
/// ```ignore
/// let client = BudgetApiClient::new(&ApiConfig::default())?;
/// let budget = client.get_budget(7).await?;
/// ```
#[derive(Debug, Clone)]
pub struct BudgetApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl BudgetApiClient {
    /// Creates a client for the service at `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .cookie_store(true)
            .default_headers(Self::headers())
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Make a GET request and parse the response.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.send(Method::GET, path, None::<&()>).await?;
        parse_json(&body)
    }

    /// Send a JSON body and parse the response.
    async fn send_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: &B,
    ) -> Result<T> {
        let body = self.send(method, path, Some(payload)).await?;
        parse_json(&body)
    }

    /// Send a request whose success response carries nothing of interest.
    async fn send_empty<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&B>,
    ) -> Result<()> {
        self.send(method, path, payload).await.map(|_| ())
    }

    async fn send<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&B>,
    ) -> Result<String> {
        let url = self.url(path);
        debug!("[BudgetApi] {} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Request(format!("{}: {}", url, e)))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Request(format!("Failed to read response from {}: {}", url, e)))?;

        check_status(status, &body, path)?;
        Ok(body)
    }
}

/// Maps a non-success status to the error taxonomy of the core crate.
fn check_status(status: StatusCode, body: &str, path: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(path.to_string()));
    }

    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(ApiErrorResponse::into_message)
        .unwrap_or_else(|| {
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            if preview.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            } else {
                preview
            }
        });

    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
        Error::Unexpected(format!("Failed to parse response: {} - {}", e, preview))
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository Trait Implementations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl BudgetRepositoryTrait for BudgetApiClient {
    async fn get_budget(&self, budget_id: i64) -> Result<Budget> {
        self.get(&format!("/Budget/{}", budget_id)).await
    }

    async fn list_budgets(&self) -> Result<Vec<Budget>> {
        let budgets: Vec<Budget> = self.get("/Budget").await?;
        debug!("[BudgetApi] Fetched {} budgets", budgets.len());
        Ok(budgets)
    }

    async fn create_budget(&self, new_budget: NewBudget) -> Result<i64> {
        let created: ApiCreatedResponse = self
            .send_json(Method::POST, "/Budget", &new_budget)
            .await?;
        info!("[BudgetApi] Created budget {}", created.id());
        Ok(created.id())
    }

    async fn update_budget(&self, budget: Budget) -> Result<()> {
        self.send_empty(Method::PUT, "/Budget", Some(&budget)).await
    }

    async fn delete_budget(&self, budget_id: i64) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("/Budget/{}", budget_id), None::<&()>)
            .await
    }
}

#[async_trait]
impl BudgetRecordRepositoryTrait for BudgetApiClient {
    async fn list_records(&self) -> Result<Vec<BudgetRecord>> {
        self.get("/BudgetRecord").await
    }

    async fn get_record(&self, record_id: i64) -> Result<BudgetRecord> {
        self.get(&format!("/BudgetRecord/{}", record_id)).await
    }

    async fn get_records_for_budget(&self, budget_id: i64) -> Result<Vec<BudgetRecord>> {
        let records: Vec<BudgetRecord> = self
            .get(&format!("/BudgetRecord/budget/{}", budget_id))
            .await?;
        debug!(
            "[BudgetApi] Fetched {} records for budget {}",
            records.len(),
            budget_id
        );
        Ok(records)
    }

    async fn create_record(&self, new_record: NewBudgetRecord) -> Result<i64> {
        let created: ApiCreatedResponse = self
            .send_json(Method::POST, "/BudgetRecord", &new_record)
            .await?;
        Ok(created.id())
    }

    async fn update_record(&self, record: BudgetRecord) -> Result<()> {
        if record.identity.is_pending() {
            return Err(Error::Unexpected(
                "Cannot update a record that has not been created".to_string(),
            ));
        }
        self.send_empty(Method::PUT, "/BudgetRecord", Some(&record))
            .await
    }

    async fn delete_record(&self, record_id: i64) -> Result<()> {
        self.send_empty(
            Method::DELETE,
            &format!("/BudgetRecord/{}", record_id),
            None::<&()>,
        )
        .await
    }
}

#[async_trait]
impl UserRepositoryTrait for BudgetApiClient {
    async fn get_current_user(&self) -> Result<UserInfo> {
        self.get("/User/userInfo").await
    }
}
