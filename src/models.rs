use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::errors::StorageError;

/// Collection that contact-form submissions are written to.
pub const LEAD_COLLECTION: &str = "lead";

/// Default number of leads returned by the list endpoint.
pub const DEFAULT_LIST_LIMIT: i64 = 10;

/// Upper bound accepted for the `limit` query parameter.
pub const MAX_LIST_LIMIT: i64 = 1000;

// ============ Storage Models ============

/// A record as it sits in a document store collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned identifier, rendered as text.
    pub id: String,
    /// The record exactly as it was submitted.
    pub body: serde_json::Value,
}

// ============ API Models ============

/// Contact-form submission accepted by `POST /api/leads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Lead {
    /// Name of the person reaching out.
    #[schema(example = "Alice")]
    pub name: String,
    /// Reply address.
    #[schema(example = "a@x.com")]
    pub email: String,
    /// Optional phone number, stored as `null` when absent.
    #[serde(default)]
    pub phone: Option<String>,
    /// Free-form message body.
    #[schema(example = "Hi")]
    pub message: String,
}

/// A stored lead as returned by `GET /api/leads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeadOut {
    /// Store-assigned identifier.
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

/// Body fields read back from a stored lead document.
///
/// Missing text fields fall back to empty strings; a field holding a
/// non-text value fails the mapping.
#[derive(Debug, Deserialize)]
struct StoredLead {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    message: String,
}

impl LeadOut {
    pub fn from_document(document: Document) -> Result<Self, StorageError> {
        let Document { id, body, .. } = document;
        let stored: StoredLead = serde_json::from_value(body).map_err(|source| {
            StorageError::Decode {
                id: id.clone(),
                source,
            }
        })?;

        Ok(Self {
            id,
            name: stored.name,
            email: stored.email,
            phone: stored.phone,
            message: stored.message,
        })
    }
}

/// Response for a successful `POST /api/leads`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadCreated {
    /// Always `"ok"`.
    #[schema(example = "ok")]
    pub status: String,
    /// Identifier assigned by the store.
    pub id: String,
}

impl LeadCreated {
    pub fn ok(id: String) -> Self {
        Self {
            status: "ok".to_string(),
            id,
        }
    }
}

/// Query parameters for `GET /api/leads`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListLeadsQuery {
    /// Maximum number of leads to return (1-1000, default 10).
    pub limit: Option<i64>,
}

impl ListLeadsQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT)
    }
}

/// Liveness response for `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RootMessage {
    pub message: String,
}

/// Storage health report for `GET /test`.
///
/// Every field is a human-readable status; the endpoint never fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnosticReport {
    pub backend: String,
    pub database: String,
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub connection_status: String,
    pub collections: Vec<String>,
}

impl Default for DiagnosticReport {
    fn default() -> Self {
        Self {
            backend: "✅ Running".to_string(),
            database: "❌ Not Available".to_string(),
            database_url: None,
            database_name: None,
            connection_status: "Not Connected".to_string(),
            collections: Vec::new(),
        }
    }
}
