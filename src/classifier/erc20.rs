//! ERC20 `transfer(address,uint256)` detection

use crate::domain::abi::DecodedArgs;
use crate::domain::chain::ChainAddress;
use crate::domain::selectors::{ERC20_TRANSFER, ERC20_TRANSFER_SIGNATURE};
use crate::domain::tx::builders;
use crate::domain::tx::metadata;
use crate::domain::tx::{RawTransaction, TxType, TypedTransaction};
use crate::error::{DecodeError, Result};

use super::{enrich, TransactionDecoder};

const TRANSFER_METHOD: &str = "transfer";

/// `Ok(None)` when the call is not a token transfer.
///
/// Arguments are read by position; verified token interfaces disagree on
/// parameter names (`to`/`recipient`/`dst`, `amount`/`value`/`wad`).
pub(super) async fn classify(
    decoder: &TransactionDecoder,
    tx: &RawTransaction,
    token: ChainAddress,
) -> Result<Option<TypedTransaction>> {
    if tx.selector() != Some(*ERC20_TRANSFER) {
        return Ok(None);
    }

    let abi = decoder.abis.resolve_token(&token).await?;
    let args = decoder
        .decoder
        .decode_arguments(&abi, Some(TRANSFER_METHOD), &tx.data)?;
    let recipient = args.get_address(positional(&args, 0)?)?;
    let amount = args.get_big_int(positional(&args, 1)?)?;

    let info = enrich::token_info(decoder.tokens.as_ref(), &token, decoder.network_timeout()).await;
    tracing::debug!(
        tx = %tx.hash,
        %token,
        symbol = %info.symbol,
        signature = ERC20_TRANSFER_SIGNATURE,
        "erc20 transfer"
    );

    let mut work = tx.clone();
    enrich::stage_token(&mut work.metadata, token, &info)?;
    work.metadata
        .insert_once(metadata::RECIPIENT, ChainAddress::new(token.chain, recipient))?;
    work.metadata.insert_once(metadata::AMOUNT, amount)?;
    work.tx_type = TxType::Erc20Transfer;

    Ok(Some(TypedTransaction::Erc20Transfer(
        builders::build_erc20_transfer(&work)?,
    )))
}

pub(super) fn positional(args: &DecodedArgs, index: usize) -> Result<&str> {
    args.key_at(index).ok_or_else(|| DecodeError::ArgumentMissing {
        key: format!("arg{index}"),
    })
}
