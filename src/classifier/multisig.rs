//! Custody MultiSig wallet call detection

use crate::domain::abi::{ContractAbi, DecodedArgs};
use crate::domain::chain::{ChainAddress, ChainType};
use crate::domain::selectors::{multisig_method, MultiSigMethod};
use crate::domain::tx::builders;
use crate::domain::tx::metadata::{self, Metadata};
use crate::domain::tx::{RawTransaction, TxType, TypedTransaction};
use crate::error::{DecodeError, Result};

use super::erc20::positional;
use super::{enrich, TransactionDecoder};

/// `Ok(None)` when the selector is not one of the wallet's methods
pub(super) async fn classify(
    decoder: &TransactionDecoder,
    tx: &RawTransaction,
    abi: &ContractAbi,
) -> Result<Option<TypedTransaction>> {
    let Some(method) = tx.selector().and_then(multisig_method) else {
        return Ok(None);
    };

    let args = decoder
        .decoder
        .decode_arguments(abi, Some(method.name), &tx.data)?;

    let mut work = tx.clone();
    stage(decoder, method, &args, tx.chain, &mut work.metadata).await?;
    work.tx_type = method.tx_type;

    tracing::debug!(tx = %tx.hash, method = method.name, "multisig call");
    builders::build(&work).map(Some)
}

async fn stage(
    decoder: &TransactionDecoder,
    method: &MultiSigMethod,
    args: &DecodedArgs,
    chain: ChainType,
    meta: &mut Metadata,
) -> Result<()> {
    let address_at = |index: usize| -> Result<ChainAddress> {
        let address = args.get_address(positional(args, index)?)?;
        Ok(ChainAddress::new(chain, address))
    };

    match method.tx_type {
        TxType::MultiSigWithdrawalRequest => {
            let token = address_at(0)?;
            let recipient = address_at(1)?;
            let amount = args.get_big_int(positional(args, 2)?)?;
            let nonce = args.get_uint64(positional(args, 3)?)?;
            stage_enriched_token(decoder, meta, token).await?;
            meta.insert_once(metadata::RECIPIENT, recipient)?;
            meta.insert_once(metadata::AMOUNT, amount)?;
            meta.insert_once(metadata::WITHDRAWAL_NONCE, nonce)?;
        }
        TxType::MultiSigSignWithdrawal | TxType::MultiSigExecuteWithdrawal => {
            let request_id = args.get_bytes32(positional(args, 0)?)?;
            meta.insert_once(metadata::REQUEST_ID, request_id)?;
        }
        TxType::MultiSigAddSupportedToken | TxType::MultiSigRemoveSupportedToken => {
            let token = address_at(0)?;
            stage_enriched_token(decoder, meta, token).await?;
        }
        TxType::MultiSigRecoveryRequest
        | TxType::MultiSigCancelRecovery
        | TxType::MultiSigExecuteRecovery => {}
        TxType::MultiSigProposeRecoveryAddress => {
            meta.insert_once(metadata::RECOVERY_ADDRESS, address_at(0)?)?;
        }
        TxType::MultiSigSignRecoveryAddress => {
            let proposal_id = args.get_bytes32(positional(args, 0)?)?;
            meta.insert_once(metadata::PROPOSAL_ID, proposal_id)?;
        }
        other => {
            return Err(DecodeError::MethodNotFound {
                method: format!("{} has no multisig staging for {other}", method.name),
            })
        }
    }
    Ok(())
}

async fn stage_enriched_token(
    decoder: &TransactionDecoder,
    meta: &mut Metadata,
    token: ChainAddress,
) -> Result<()> {
    let info = enrich::token_info(decoder.tokens.as_ref(), &token, decoder.network_timeout()).await;
    enrich::stage_token(meta, token, &info)
}
