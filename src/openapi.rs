use utoipa::OpenApi;

use crate::errors::ErrorBody;
use crate::handlers;
use crate::models::{DiagnosticReport, Lead, LeadCreated, LeadOut, RootMessage};

/// OpenAPI document served at `/openapi.json` and rendered by Swagger UI at `/docs`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Il Marketing Much More API",
        description = "Contact form lead intake and listing."
    ),
    paths(
        handlers::read_root,
        handlers::test_database,
        handlers::create_lead,
        handlers::list_leads
    ),
    components(schemas(Lead, LeadOut, LeadCreated, RootMessage, DiagnosticReport, ErrorBody)),
    tags(
        (name = "health", description = "Liveness and storage diagnostics"),
        (name = "leads", description = "Contact form submissions")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in ["/", "/test", "/api/leads"] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {expected}"
            );
        }
        let leads = &doc.paths.paths["/api/leads"];
        assert!(leads.operations.len() >= 2);
    }
}
