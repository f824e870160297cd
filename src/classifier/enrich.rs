//! Token symbol/decimals enrichment

use std::time::Duration;

use crate::domain::chain::ChainAddress;
use crate::domain::tx::metadata::{self, Metadata};
use crate::error::Result;
use crate::store::tokens::{TokenInfo, TokenRegistry};

pub const UNKNOWN_TOKEN_SYMBOL: &str = "UNKNOWN";
pub const NATIVE_COIN_DECIMALS: u8 = 18;

/// Resolve display details for `token`. Never fails.
///
/// The zero address stands for the chain's native coin. Unregistered tokens
/// and registry failures fall back to `UNKNOWN` with 0 decimals.
pub async fn token_info(
    registry: &dyn TokenRegistry,
    token: &ChainAddress,
    limit: Duration,
) -> TokenInfo {
    if token.is_zero() {
        return TokenInfo::new(token.chain.native_symbol(), NATIVE_COIN_DECIMALS);
    }

    match tokio::time::timeout(limit, registry.lookup(token)).await {
        Ok(Ok(Some(info))) => info,
        Ok(Ok(None)) => {
            tracing::debug!(%token, "token not registered");
            unknown()
        }
        Ok(Err(err)) => {
            tracing::warn!(%token, error = %err, "token registry lookup failed");
            unknown()
        }
        Err(_) => {
            tracing::warn!(%token, timeout_ms = limit.as_millis() as u64, "token registry lookup timed out");
            unknown()
        }
    }
}

fn unknown() -> TokenInfo {
    TokenInfo::new(UNKNOWN_TOKEN_SYMBOL, 0)
}

/// Stage token address, symbol and decimals
pub fn stage_token(meta: &mut Metadata, token: ChainAddress, info: &TokenInfo) -> Result<()> {
    meta.insert_once(metadata::TOKEN_ADDRESS, token)?;
    meta.insert_once(metadata::TOKEN_SYMBOL, info.symbol.as_str())?;
    meta.insert_once(metadata::TOKEN_DECIMALS, u64::from(info.decimals))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain::ChainType;
    use crate::store::tokens::StaticTokenRegistry;
    use alloy_primitives::Address;

    struct Stalled;

    #[async_trait::async_trait]
    impl TokenRegistry for Stalled {
        async fn lookup(&self, _token: &ChainAddress) -> anyhow::Result<Option<TokenInfo>> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_native_coin() {
        let registry = StaticTokenRegistry::new();
        let zero = ChainAddress::new(ChainType::Polygon, Address::ZERO);
        let info = token_info(&registry, &zero, Duration::from_secs(1)).await;
        assert_eq!(info, TokenInfo::new("POL", 18));
    }

    #[tokio::test]
    async fn test_registered_and_unknown() {
        let usdc = ChainAddress::new(ChainType::Ethereum, Address::repeat_byte(0xa0));
        let registry = StaticTokenRegistry::new().with(usdc, TokenInfo::new("USDC", 6));
        assert_eq!(
            token_info(&registry, &usdc, Duration::from_secs(1)).await,
            TokenInfo::new("USDC", 6)
        );

        let other = ChainAddress::new(ChainType::Ethereum, Address::repeat_byte(0xb0));
        assert_eq!(
            token_info(&registry, &other, Duration::from_secs(1)).await,
            TokenInfo::new("UNKNOWN", 0)
        );
    }

    #[tokio::test]
    async fn test_slow_registry_times_out() {
        let token = ChainAddress::new(ChainType::Base, Address::repeat_byte(3));
        let info = token_info(&Stalled, &token, Duration::from_millis(10)).await;
        assert_eq!(info.symbol, UNKNOWN_TOKEN_SYMBOL);
    }

    #[test]
    fn test_stage_token_is_repeatable() {
        let token = ChainAddress::new(ChainType::Ethereum, Address::repeat_byte(9));
        let info = TokenInfo::new("DAI", 18);
        let mut meta = Metadata::new();
        stage_token(&mut meta, token, &info).unwrap();
        stage_token(&mut meta, token, &info).unwrap();
        assert_eq!(meta.len(), 3);
        assert_eq!(meta.get_uint64(metadata::TOKEN_DECIMALS).unwrap(), 18);

        let err = stage_token(&mut meta, token, &TokenInfo::new("DAI", 6)).unwrap_err();
        assert!(err.to_string().contains(metadata::TOKEN_DECIMALS));
    }
}
