//! Asset summaries decoded from the asset-graph query

use serde::{Deserialize, Deserializer, Serialize};

/// An asset as returned by the list query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSummary {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(
        rename = "AssetHasNetworkInterface",
        default,
        deserialize_with = "null_as_default"
    )]
    pub interfaces: Vec<NetworkInterface>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    #[serde(rename = "ipAddress", default, deserialize_with = "null_as_default")]
    pub ip_address: String,
    #[serde(
        rename = "NetworkInterfaceHasHostname",
        default,
        deserialize_with = "null_as_default"
    )]
    pub hostnames: Vec<HostnameBinding>,
}

/// Link between a network interface and a (possibly empty) hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostnameBinding {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// The `assets` section of a query response.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetPage {
    pub results: Vec<AssetSummary>,
    #[serde(default)]
    pub total: Option<serde_json::Number>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub assets: AssetPage,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl AssetSummary {
    /// Every hostname binding across all interfaces, in order.
    pub fn hostnames(&self) -> impl Iterator<Item = &HostnameBinding> {
        self.interfaces.iter().flat_map(|ni| ni.hostnames.iter())
    }
}
