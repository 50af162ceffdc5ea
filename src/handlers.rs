use crate::config::Config;
use crate::db_storage::DocumentStore;
use crate::errors::{AppError, ResultExt, StorageError};
use crate::extract::{AppJson, AppQuery};
use crate::models::*;
use crate::validation::validate_lead;
use axum::{extract::State, Json};
use std::sync::Arc;
use std::time::Duration;

/// Human-readable service name used in the liveness message.
pub const SERVICE_NAME: &str = "Il Marketing Much More API";

/// Number of collection names reported by the diagnostic endpoint.
const DIAGNOSTIC_COLLECTION_LIMIT: i64 = 10;

/// Upper bound on how long the diagnostic endpoint waits for the store.
const DIAGNOSTIC_TIMEOUT: Duration = Duration::from_secs(5);

/// Error messages in the diagnostic report are cut to this many characters.
const DIAGNOSTIC_ERROR_CHARS: usize = 80;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Document store; `None` when storage is not configured.
    pub store: Option<Arc<dyn DocumentStore>>,
}

impl AppState {
    pub fn new(config: Config, store: Option<Arc<dyn DocumentStore>>) -> Self {
        Self { config, store }
    }

    /// Returns the configured store or a configuration error.
    pub fn store(&self) -> Result<&dyn DocumentStore, AppError> {
        self.store.as_deref().ok_or(AppError::NotConfigured)
    }
}

/// GET /
///
/// Liveness check. Has no side effects and always succeeds.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Service is running", body = RootMessage))
)]
pub async fn read_root() -> Json<RootMessage> {
    Json(RootMessage {
        message: format!("{} is running", SERVICE_NAME),
    })
}

/// GET /test
///
/// Reports storage health. Every failure is folded into the report as a
/// status string; the request itself always succeeds.
#[utoipa::path(
    get,
    path = "/test",
    tag = "health",
    responses((status = 200, description = "Storage diagnostic report", body = DiagnosticReport))
)]
pub async fn test_database(State(state): State<Arc<AppState>>) -> Json<DiagnosticReport> {
    let mut report = DiagnosticReport::default();

    let Some(store) = state.store.as_deref() else {
        report.database = "⚠️  Available but not initialized".to_string();
        tracing::info!("GET /test - storage not initialized");
        return Json(report);
    };

    report.database = "✅ Available".to_string();
    report.database_url = Some(if state.config.database_url.is_some() {
        "✅ Set".to_string()
    } else {
        "❌ Not Set".to_string()
    });
    report.database_name = Some(
        state
            .config
            .database_name
            .clone()
            .unwrap_or_else(|| "❌ Not Set".to_string()),
    );
    report.connection_status = "Connected".to_string();

    let listing = tokio::time::timeout(
        DIAGNOSTIC_TIMEOUT,
        store.list_collection_names(DIAGNOSTIC_COLLECTION_LIMIT),
    )
    .await;

    match listing {
        Ok(Ok(collections)) => {
            report.collections = collections;
            report.database = "✅ Connected & Working".to_string();
        }
        Ok(Err(e)) => {
            tracing::warn!("GET /test - {} store error: {}", store.backend_name(), e);
            report.database = format!("⚠️  Connected but Error: {}", truncate(&e.to_string()));
        }
        Err(_) => {
            tracing::warn!("GET /test - {} store timed out", store.backend_name());
            report.database = format!(
                "⚠️  Connected but Error: timed out after {}s",
                DIAGNOSTIC_TIMEOUT.as_secs()
            );
        }
    }

    Json(report)
}

fn truncate(message: &str) -> String {
    message.chars().take(DIAGNOSTIC_ERROR_CHARS).collect()
}

/// POST /api/leads
///
/// Contact form lead intake. Validates the body, stores it in the `lead`
/// collection and returns the identifier assigned by the store.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `lead` - JSON body with the lead fields.
///
/// # Returns
///
/// * `Result<Json<LeadCreated>, AppError>` - The assigned id or an error.
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "leads",
    request_body = Lead,
    responses(
        (status = 200, description = "Lead stored", body = LeadCreated),
        (status = 422, description = "Body failed validation", body = crate::errors::ErrorBody),
        (status = 500, description = "Storage missing or failing", body = crate::errors::ErrorBody)
    )
)]
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    AppJson(lead): AppJson<Lead>,
) -> Result<Json<LeadCreated>, AppError> {
    tracing::info!("POST /api/leads - name: {}", lead.name);

    validate_lead(&lead, state.config.strict_email_validation)?;
    let store = state.store()?;

    let record = serde_json::to_value(&lead)
        .map_err(StorageError::from)
        .context("encoding lead")?;
    let id = store
        .create_document(LEAD_COLLECTION, &record)
        .await
        .context("storing lead")?;

    tracing::info!("Lead {} stored ({})", id, store.backend_name());
    Ok(Json(LeadCreated::ok(id)))
}

/// GET /api/leads
///
/// Lists up to `limit` stored leads, newest first.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `query` - Query parameters containing the optional `limit`.
///
/// # Returns
///
/// * `Result<Json<Vec<LeadOut>>, AppError>` - The stored leads or an error.
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "leads",
    params(ListLeadsQuery),
    responses(
        (status = 200, description = "Stored leads, newest first", body = [LeadOut]),
        (status = 422, description = "Invalid limit", body = crate::errors::ErrorBody),
        (status = 500, description = "Storage missing or failing", body = crate::errors::ErrorBody)
    )
)]
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<ListLeadsQuery>,
) -> Result<Json<Vec<LeadOut>>, AppError> {
    let limit = query.limit();
    tracing::info!("GET /api/leads - limit: {}", limit);

    if !(1..=MAX_LIST_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit: must be between 1 and {}",
            MAX_LIST_LIMIT
        )));
    }

    let store = state.store()?;
    let documents = store
        .get_documents(LEAD_COLLECTION, limit)
        .await
        .context("listing leads")?;

    let leads = documents
        .into_iter()
        .map(LeadOut::from_document)
        .collect::<Result<Vec<_>, _>>()
        .context("mapping stored leads")?;

    tracing::info!("Returning {} leads", leads.len());
    Ok(Json(leads))
}
