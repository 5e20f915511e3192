//! Fixed asset-graph query
//!
//! Issues a single AQL search for known assets with their network
//! interfaces and hostname bindings inlined, and decodes the first page.

use super::models::{AssetPage, QueryResponse};
use crate::error::{Error, Result};
use crate::session::Session;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

pub const SEARCH_PATH: &str = "/api/1.0/search/aql";

/// Results requested in the single page this tool processes.
pub const PAGE_SIZE: u32 = 250;

/// Build the AQL document sent to the search endpoint.
///
/// The `agg_*` sections feed the service's own reporting views and are not
/// read back.
pub fn asset_query() -> Value {
    let ranked = |field: &str| {
        json!({
            "aggregation": field,
            "sort": ["count desc", "value asc"],
            "count": 50
        })
    };
    let joined = |kind: &str, relationship: &str| {
        json!({
            "type": kind,
            "join": "a",
            "relationship": relationship,
            "fromLeft": true
        })
    };

    json!({
        "define": {
            "a": { "type": "Asset" },
            "g": joined("AssetGroup", "AssetMemberOfAssetGroup"),
            "s": joined("Service", "AssetHasService"),
            "c": joined("CPEItem", "AssetHasCPEItem"),
            "p": joined("Plugin", "AssetHasPlugin")
        },
        "where": [ { "and": { "==": { "a.knownAsset": "true" } } } ],
        "return": {
            "assets": {
                "object": "a",
                "page": { "start": 0, "count": PAGE_SIZE },
                "inject": {
                    "AssetHasNetworkInterface": {
                        "relationship": "AssetHasNetworkInterface",
                        "fromLeft": true,
                        "inject": {
                            "NetworkInterfaceHasHostname": {
                                "relationship": "NetworkInterfaceHasHostname",
                                "fromLeft": true
                            }
                        }
                    },
                    "AssetHasCredentials": {
                        "relationship": "AssetHasCredentials",
                        "fromLeft": true
                    },
                    "AssetHasAgent": {
                        "relationship": "AssetHasAgent",
                        "fromLeft": true
                    }
                },
                "sort": ["a.dateUpdated desc"]
            },
            "agg_operatingSystem": ranked("a.operatingSystem"),
            "agg_deviceType": ranked("a.deviceType"),
            "agg_assetOriginType": ranked("a.assetOriginType"),
            "agg_AssetMemberOfAssetGroup": {
                "aggregation": "g.id",
                "sort": ["count desc", "value asc"]
            },
            "agg_assetService": ranked("s.data"),
            "agg_assetSoftware": ranked("c.name"),
            "agg_assetPlugin": ranked("p.name"),
            "agg_assetOriginUUID": ranked("a.assetOriginUUID")
        }
    })
}

/// Run the asset query and decode the first page of results.
///
/// A response without a well-formed `assets` section is an error; no partial
/// list is returned.
pub async fn list_assets(session: &dyn Session) -> Result<AssetPage> {
    let body = serde_json::to_vec(&asset_query())?;
    let raw = session.perform(Method::POST, SEARCH_PATH, Some(&body)).await?;

    let response: QueryResponse = serde_json::from_slice(&raw)
        .map_err(|e| Error::Decode(format!("Malformed asset query response: {}", e)))?;

    let page = response.assets;
    info!(
        "Asset query returned {} assets (total reported: {})",
        page.results.len(),
        page.total
            .as_ref()
            .map_or_else(|| "unknown".to_string(), |n| n.to_string())
    );
    debug!(
        "Asset ids: {:?}",
        page.results.iter().map(|a| a.id.as_str()).collect::<Vec<_>>()
    );

    Ok(page)
}
