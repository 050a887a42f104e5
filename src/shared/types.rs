//! Common types used across the application

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::errors::AssetIdError;

/// CAIP-2 chain identifiers of the chains the backend routes through
pub mod chains {
    pub const BITCOIN: &str = "bip122:000000000019d6689c085ae165831e93";
    pub const BITCOIN_CASH: &str = "bip122:000000000000000000651ef99cb9fcbf";
    pub const LITECOIN: &str = "bip122:12a765e31ffd4059bada1e25190f6e98";
    pub const DOGECOIN: &str = "bip122:00000000001a91e3dace36e2be3bf030";
    pub const ETHEREUM: &str = "eip155:1";
    pub const AVALANCHE: &str = "eip155:43114";
    pub const BNB_SMART_CHAIN: &str = "eip155:56";
    pub const COSMOS_HUB: &str = "cosmos:cosmoshub-4";
    pub const THORCHAIN: &str = "cosmos:thorchain-mainnet-v1";
}

const NATIVE_NAMESPACE: &str = "slip44";
const TOKEN_NAMESPACE: &str = "erc20";

/// CAIP-19 asset identifier: `<chain_id>/<namespace>:<reference>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn parts(&self) -> (&str, &str, &str) {
        // Shape is validated on construction
        let (chain_id, asset) = self.0.split_once('/').unwrap_or((&self.0, ""));
        let (namespace, reference) = asset.split_once(':').unwrap_or((asset, ""));
        (chain_id, namespace, reference)
    }

    pub fn chain_id(&self) -> &str {
        self.parts().0
    }

    pub fn namespace(&self) -> &str {
        self.parts().1
    }

    pub fn reference(&self) -> &str {
        self.parts().2
    }

    /// Native assets are the chain's fee currency and have no allowance concept.
    pub fn is_native(&self) -> bool {
        self.namespace() == NATIVE_NAMESPACE
    }

    /// Contract address for token assets
    pub fn token_address(&self) -> Option<&str> {
        (self.namespace() == TOKEN_NAMESPACE).then(|| self.reference())
    }
}

impl FromStr for AssetId {
    type Err = AssetIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || AssetIdError::Malformed(s.to_string());
        let (chain_id, asset) = s.split_once('/').ok_or_else(malformed)?;
        let (chain_namespace, chain_reference) = chain_id.split_once(':').ok_or_else(malformed)?;
        let (namespace, reference) = asset.split_once(':').ok_or_else(malformed)?;

        if [chain_namespace, chain_reference, namespace, reference]
            .iter()
            .any(|part| part.is_empty())
        {
            return Err(malformed());
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for AssetId {
    type Error = AssetIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AssetId> for String {
    fn from(value: AssetId) -> Self {
        value.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Asset representation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: AssetId,
    pub symbol: String,
    pub precision: u32,
}

impl Asset {
    pub fn new(asset_id: AssetId, symbol: impl Into<String>, precision: u32) -> Self {
        Self { asset_id, symbol: symbol.into(), precision }
    }

    pub fn chain_id(&self) -> &str {
        self.asset_id.chain_id()
    }

    pub fn is_native(&self) -> bool {
        self.asset_id.is_native()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_native_asset_id() {
        let eth: AssetId = "eip155:1/slip44:60".parse().unwrap();
        assert_eq!(eth.chain_id(), chains::ETHEREUM);
        assert_eq!(eth.namespace(), "slip44");
        assert_eq!(eth.reference(), "60");
        assert!(eth.is_native());
        assert_eq!(eth.token_address(), None);
    }

    #[test]
    fn test_parse_token_asset_id() {
        let usdc: AssetId = "eip155:1/erc20:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
            .parse()
            .unwrap();
        assert!(!usdc.is_native());
        assert_eq!(usdc.token_address(), Some("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"));
    }

    #[test]
    fn test_reject_malformed_asset_id() {
        assert!("eip155:1".parse::<AssetId>().is_err());
        assert!("eip155:1/slip44".parse::<AssetId>().is_err());
        assert!("eip155/slip44:60".parse::<AssetId>().is_err());
        assert!("eip155:1/:60".parse::<AssetId>().is_err());
    }

    #[test]
    fn test_asset_id_serde_validates() {
        let json = "\"eip155:1/slip44:60\"";
        let id: AssetId = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), json);
        assert!(serde_json::from_str::<AssetId>("\"nonsense\"").is_err());
    }
}
