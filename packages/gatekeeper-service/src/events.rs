//! API lifecycle event handling.
//!
//! The host's event bus maps its own event types onto the four operations
//! here. Specification documents are fetched through the `DefinitionSource`
//! seam; the registry itself stays outside this crate.

use std::sync::Arc;

use tracing::{debug, info, warn};

use gatekeeper_engine::constants::DEFAULT_SIMILARITY_THRESHOLD;
use gatekeeper_engine::Result;

use crate::service::GatekeeperService;

/// API lifecycle status that triggers indexing on lifecycle-change events.
const STATUS_PUBLISHED: &str = "PUBLISHED";

/// Fetches the specification document for an API from the host registry.
pub trait DefinitionSource: Send + Sync {
    /// Returns the document, or `None` when the registry has no
    /// specification for this API.
    fn fetch_definition(&self, api_uuid: &str, organization: &str) -> Result<Option<String>>;
}

/// An API lifecycle notification from the host's event bus.
#[derive(Debug, Clone)]
pub struct ApiEvent {
    pub api_uuid: String,
    pub api_name: Option<String>,
    pub api_version: Option<String>,
    pub organization: String,
    /// Lifecycle status for lifecycle-change events (e.g. `PUBLISHED`).
    pub status: Option<String>,
}

impl ApiEvent {
    pub fn new(api_uuid: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            api_uuid: api_uuid.into(),
            api_name: None,
            api_version: None,
            organization: organization.into(),
            status: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.api_name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    fn display_name(&self) -> &str {
        self.api_name.as_deref().unwrap_or(&self.api_uuid)
    }
}

/// Applies API lifecycle events to the deduplication index.
pub struct GatekeeperEventHandler {
    service: Arc<GatekeeperService>,
    definitions: Box<dyn DefinitionSource>,
}

impl GatekeeperEventHandler {
    pub fn new(service: Arc<GatekeeperService>, definitions: Box<dyn DefinitionSource>) -> Self {
        Self {
            service,
            definitions,
        }
    }

    /// A new API was created: check for duplicates, then index it.
    pub fn on_api_create(&self, event: &ApiEvent) -> Result<()> {
        self.check_and_index(event)
    }

    /// An API was updated: re-check and re-index.
    pub fn on_api_update(&self, event: &ApiEvent) -> Result<()> {
        self.check_and_index(event)
    }

    /// An API was deleted: drop it from the index and the store.
    pub fn on_api_delete(&self, event: &ApiEvent) -> Result<()> {
        self.service
            .remove_api(&event.api_uuid, &event.organization)?;
        info!(api = %event.display_name(), api_uuid = %event.api_uuid, "removed API from deduplication index");
        Ok(())
    }

    /// An API changed lifecycle state. Only `PUBLISHED` triggers indexing;
    /// every other status is ignored.
    pub fn on_api_lifecycle_change(&self, event: &ApiEvent) -> Result<()> {
        if event.status.as_deref() == Some(STATUS_PUBLISHED) {
            self.check_and_index(event)
        } else {
            debug!(
                api_uuid = %event.api_uuid,
                status = event.status.as_deref().unwrap_or(""),
                "ignoring lifecycle status"
            );
            Ok(())
        }
    }

    fn check_and_index(&self, event: &ApiEvent) -> Result<()> {
        let Some(definition) = self
            .definitions
            .fetch_definition(&event.api_uuid, &event.organization)?
        else {
            warn!(
                api_uuid = %event.api_uuid,
                "no specification found for API; skipping deduplication check"
            );
            return Ok(());
        };

        // Check before indexing so the API does not match itself.
        let result = self.service.check_for_duplicates(
            &definition,
            &event.api_uuid,
            &event.organization,
            DEFAULT_SIMILARITY_THRESHOLD,
        )?;

        if result.is_duplicate {
            for report in &result.conflict_reports {
                warn!(
                    api = %event.display_name(),
                    matched_api_uuid = %report.matched_api_uuid,
                    similarity = report.similarity_score,
                    "API appears similar to an existing API"
                );
            }
        } else {
            info!(api = %event.display_name(), "no duplicates found for API");
        }

        self.service
            .index_api(&definition, &event.api_uuid, &event.organization)?;
        info!(api = %event.display_name(), api_uuid = %event.api_uuid, "indexed API for deduplication");
        Ok(())
    }
}
