//! Detail fetch for orphaned assets
//!
//! The detail endpoint returns more nested associations than the list query,
//! so patches are always applied to a freshly fetched record.

use crate::error::{Error, Result};
use crate::inventory::AssetSummary;
use crate::session::Session;
use reqwest::Method;
use tracing::debug;

/// Path of the single-asset resource.
///
/// The id is percent-encoded as one path segment, so `/`, `?` and `#` in an id
/// cannot address a different resource. Ids that would resolve to the
/// collection itself are rejected.
pub fn asset_path(id: &str) -> Result<String> {
    if matches!(id, "" | "." | "..") {
        return Err(Error::Decode(format!("Asset id {:?} is not addressable", id)));
    }
    Ok(format!("/api/1.0/assets/{}", urlencoding::encode(id)))
}

/// The exact serialized text of one asset's detail payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord(String);

impl RawRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<Vec<u8>> for RawRecord {
    type Error = Error;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        String::from_utf8(bytes)
            .map(RawRecord)
            .map_err(|e| Error::Decode(format!("Asset record is not valid UTF-8: {}", e)))
    }
}

/// An orphaned asset paired with its detail record.
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    pub asset: AssetSummary,
    pub record: RawRecord,
}

/// Fetch the full record for `asset`.
pub async fn fetch_detail(session: &dyn Session, asset: AssetSummary) -> Result<FetchedAsset> {
    let raw = session
        .perform(Method::GET, &asset_path(&asset.id)?, None)
        .await?;
    let record = RawRecord::try_from(raw)?;
    debug!("Fetched {} ({} bytes)", asset.name, record.as_str().len());

    Ok(FetchedAsset { asset, record })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Credentials, HttpSession, MockResponse, MockSession};
    use std::time::Duration;

    fn summary(id: &str) -> AssetSummary {
        AssetSummary {
            id: id.to_string(),
            name: format!("host-{id}"),
            interfaces: vec![],
        }
    }

    #[tokio::test]
    async fn test_fetch_detail_keeps_exact_text() {
        let body = "{ \"id\" : \"42\",\n  \"name\":\"host-42\" }";
        let mock = MockSession::new().on(Method::GET, "/api/1.0/assets/42", MockResponse::ok(body));

        let fetched = fetch_detail(&mock, summary("42")).await.unwrap();
        assert_eq!(fetched.record.as_str(), body);
        assert_eq!(fetched.asset.id, "42");
    }

    #[tokio::test]
    async fn test_fetch_detail_propagates_request_failure() {
        let mock = MockSession::new().on(
            Method::GET,
            "/api/1.0/assets/7",
            MockResponse::status(500, "oops"),
        );
        let err = fetch_detail(&mock, summary("7")).await.unwrap_err();
        assert!(matches!(err, Error::RequestFailed { status: 500, .. }));
    }

    #[test]
    fn test_asset_path_escapes_reserved_characters() {
        assert_eq!(asset_path("42").unwrap(), "/api/1.0/assets/42");
        assert_eq!(asset_path("a#b").unwrap(), "/api/1.0/assets/a%23b");
        assert_eq!(asset_path("a?b").unwrap(), "/api/1.0/assets/a%3Fb");
        assert_eq!(
            asset_path("../search/aql").unwrap(),
            "/api/1.0/assets/..%2Fsearch%2Faql"
        );
    }

    #[test]
    fn test_escaped_asset_path_stays_on_the_asset_resource() {
        let session = HttpSession::new(
            "https://usm.example.com",
            Credentials::default(),
            Duration::from_secs(1),
        )
        .unwrap();

        for id in ["a#b", "a?b", "../search/aql"] {
            let url = session.build_url(&asset_path(id).unwrap()).unwrap();
            assert!(url.path().starts_with("/api/1.0/assets/"), "{id} -> {url}");
            assert_eq!(url.path_segments().unwrap().count(), 4, "{id} -> {url}");
            assert_eq!(url.query(), None);
            assert_eq!(url.fragment(), None);
        }
    }

    #[test]
    fn test_dot_segment_ids_are_rejected() {
        for id in ["", ".", ".."] {
            assert!(matches!(asset_path(id), Err(Error::Decode(_))));
        }
    }

    #[tokio::test]
    async fn test_fetch_detail_uses_escaped_path() {
        let mock = MockSession::new().on(
            Method::GET,
            "/api/1.0/assets/a%23b",
            MockResponse::ok("{}"),
        );
        fetch_detail(&mock, summary("a#b")).await.unwrap();
        assert_eq!(mock.calls()[0].path, "/api/1.0/assets/a%23b");
    }

    #[test]
    fn test_non_utf8_record_is_decode_error() {
        let err = RawRecord::try_from(vec![0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
