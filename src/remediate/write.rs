use super::fetch::{asset_path, RawRecord};
use crate::error::Result;
use crate::inventory::AssetSummary;
use crate::session::Session;
use reqwest::Method;
use tracing::debug;

/// Acknowledgement for one accepted write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteAck {
    pub asset_id: String,
    pub name: String,
}

/// Replace the asset's record with `patched`.
pub async fn write_back(
    session: &dyn Session,
    asset: &AssetSummary,
    patched: &RawRecord,
) -> Result<WriteAck> {
    session
        .perform(Method::PUT, &asset_path(&asset.id)?, Some(patched.as_bytes()))
        .await?;
    debug!("Wrote back {}", asset.name);

    Ok(WriteAck {
        asset_id: asset.id.clone(),
        name: asset.name.clone(),
    })
}
