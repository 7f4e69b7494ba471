//! Discovery plus export, as served to callers.

use serde::Serialize;
use tracing::warn;

use super::{Discovery, DiscoveryRequest, DiscoveryResult};
use crate::config::DbKind;
use crate::export::Exporter;
use crate::graph::SchemaGraph;

/// Successful discovery response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryResponse {
    pub status: &'static str,
    pub schema: SchemaGraph,
    /// Web path of the exported file, when the request asked to save.
    pub export_path: Option<String>,
}

/// Runs a discovery and exports the result when asked to.
#[derive(Clone)]
pub struct DiscoveryService {
    discovery: Discovery,
    exporter: Exporter,
}

impl DiscoveryService {
    pub fn new(discovery: Discovery, exporter: Exporter) -> Self {
        Self {
            discovery,
            exporter,
        }
    }

    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    pub async fn run(
        &self,
        kind: DbKind,
        request: &DiscoveryRequest,
    ) -> DiscoveryResult<DiscoveryResponse> {
        let schema = self.discovery.discover(kind, request).await?;

        let export_path = if request.save {
            match self.exporter.export(&schema) {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(error = %e, "export failed");
                    return Err(e.into());
                }
            }
        } else {
            None
        };

        Ok(DiscoveryResponse {
            status: "ok",
            schema,
            export_path,
        })
    }
}
