//! Builders turning a tagged transaction plus metadata into a typed variant
//!
//! Every builder first checks that the type tag already names its variant,
//! then reads required keys through the metadata getters. Builders never
//! mutate their input; they return a fresh value that owns a copy of it.

use super::metadata::{self, Metadata};
use super::raw::{RawTransaction, TxType};
use super::typed::*;
use crate::error::{DecodeError, Result};

pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;
pub const DEFAULT_TOKEN_SYMBOL: &str = "";

/// Rebuild whichever variant `tx.tx_type` names.
pub fn build(tx: &RawTransaction) -> Result<TypedTransaction> {
    Ok(match tx.tx_type {
        TxType::Untyped | TxType::ContractCall => TypedTransaction::Untyped(tx.clone()),
        TxType::NativeTransfer => TypedTransaction::NativeTransfer(build_native_transfer(tx)?),
        TxType::ContractDeploy => TypedTransaction::ContractDeploy(build_contract_deploy(tx)?),
        TxType::Erc20Transfer => TypedTransaction::Erc20Transfer(build_erc20_transfer(tx)?),
        TxType::MultiSigWithdrawalRequest => {
            TypedTransaction::MultiSigWithdrawalRequest(build_withdrawal_request(tx)?)
        }
        TxType::MultiSigSignWithdrawal => {
            TypedTransaction::MultiSigSignWithdrawal(build_sign_withdrawal(tx)?)
        }
        TxType::MultiSigExecuteWithdrawal => {
            TypedTransaction::MultiSigExecuteWithdrawal(build_execute_withdrawal(tx)?)
        }
        TxType::MultiSigAddSupportedToken => TypedTransaction::MultiSigAddSupportedToken(
            build_token_support(tx, TxType::MultiSigAddSupportedToken)?,
        ),
        TxType::MultiSigRemoveSupportedToken => TypedTransaction::MultiSigRemoveSupportedToken(
            build_token_support(tx, TxType::MultiSigRemoveSupportedToken)?,
        ),
        TxType::MultiSigRecoveryRequest => TypedTransaction::MultiSigRecoveryRequest(
            build_recovery(tx, TxType::MultiSigRecoveryRequest)?,
        ),
        TxType::MultiSigCancelRecovery => TypedTransaction::MultiSigCancelRecovery(
            build_recovery(tx, TxType::MultiSigCancelRecovery)?,
        ),
        TxType::MultiSigExecuteRecovery => TypedTransaction::MultiSigExecuteRecovery(
            build_recovery(tx, TxType::MultiSigExecuteRecovery)?,
        ),
        TxType::MultiSigProposeRecoveryAddress => {
            TypedTransaction::MultiSigProposeRecoveryAddress(build_propose_recovery_address(tx)?)
        }
        TxType::MultiSigSignRecoveryAddress => {
            TypedTransaction::MultiSigSignRecoveryAddress(build_sign_recovery_address(tx)?)
        }
    })
}

pub fn build_native_transfer(tx: &RawTransaction) -> Result<NativeTransfer> {
    expect_type(tx, TxType::NativeTransfer)?;
    let recipient = tx.to.ok_or_else(|| {
        DecodeError::field("to", DecodeError::ArgumentMissing { key: "to".into() })
    })?;
    Ok(NativeTransfer {
        raw: tx.clone(),
        recipient,
        amount: tx.value,
    })
}

pub fn build_contract_deploy(tx: &RawTransaction) -> Result<ContractDeploy> {
    expect_type(tx, TxType::ContractDeploy)?;
    if tx.to.is_some() {
        return Err(DecodeError::field(
            "to",
            DecodeError::ArgumentTypeMismatch {
                key: "to".into(),
                expected: "empty recipient",
                got: "address".into(),
            },
        ));
    }
    let contract_address = optional(
        &tx.metadata,
        metadata::CONTRACT_ADDRESS,
        |m, k| m.get_address(k).map(Some),
        None,
    )?;
    Ok(ContractDeploy {
        raw: tx.clone(),
        contract_address,
    })
}

pub fn build_erc20_transfer(tx: &RawTransaction) -> Result<Erc20Transfer> {
    expect_type(tx, TxType::Erc20Transfer)?;
    let meta = &tx.metadata;
    let (token_symbol, token_decimals) = token_details(meta)?;
    Ok(Erc20Transfer {
        raw: tx.clone(),
        token_address: required(meta, metadata::TOKEN_ADDRESS, Metadata::get_address)?,
        recipient: required(meta, metadata::RECIPIENT, Metadata::get_address)?,
        amount: required(meta, metadata::AMOUNT, Metadata::get_big_int)?,
        token_symbol,
        token_decimals,
    })
}

pub fn build_withdrawal_request(tx: &RawTransaction) -> Result<MultiSigWithdrawalRequest> {
    expect_type(tx, TxType::MultiSigWithdrawalRequest)?;
    let meta = &tx.metadata;
    let (token_symbol, token_decimals) = token_details(meta)?;
    Ok(MultiSigWithdrawalRequest {
        raw: tx.clone(),
        token_address: required(meta, metadata::TOKEN_ADDRESS, Metadata::get_address)?,
        recipient: required(meta, metadata::RECIPIENT, Metadata::get_address)?,
        amount: required(meta, metadata::AMOUNT, Metadata::get_big_int)?,
        withdrawal_nonce: required(meta, metadata::WITHDRAWAL_NONCE, Metadata::get_uint64)?,
        token_symbol,
        token_decimals,
    })
}

pub fn build_sign_withdrawal(tx: &RawTransaction) -> Result<MultiSigSignWithdrawal> {
    expect_type(tx, TxType::MultiSigSignWithdrawal)?;
    Ok(MultiSigSignWithdrawal {
        raw: tx.clone(),
        request_id: required(&tx.metadata, metadata::REQUEST_ID, Metadata::get_bytes32)?,
    })
}

pub fn build_execute_withdrawal(tx: &RawTransaction) -> Result<MultiSigExecuteWithdrawal> {
    expect_type(tx, TxType::MultiSigExecuteWithdrawal)?;
    Ok(MultiSigExecuteWithdrawal {
        raw: tx.clone(),
        request_id: required(&tx.metadata, metadata::REQUEST_ID, Metadata::get_bytes32)?,
    })
}

/// Add and remove supported token share a payload; `kind` selects which tag is expected.
pub fn build_token_support(tx: &RawTransaction, kind: TxType) -> Result<MultiSigTokenSupport> {
    debug_assert!(matches!(
        kind,
        TxType::MultiSigAddSupportedToken | TxType::MultiSigRemoveSupportedToken
    ));
    expect_type(tx, kind)?;
    let meta = &tx.metadata;
    let (token_symbol, token_decimals) = token_details(meta)?;
    Ok(MultiSigTokenSupport {
        raw: tx.clone(),
        token_address: required(meta, metadata::TOKEN_ADDRESS, Metadata::get_address)?,
        token_symbol,
        token_decimals,
    })
}

pub fn build_recovery(tx: &RawTransaction, kind: TxType) -> Result<MultiSigRecovery> {
    debug_assert!(matches!(
        kind,
        TxType::MultiSigRecoveryRequest
            | TxType::MultiSigCancelRecovery
            | TxType::MultiSigExecuteRecovery
    ));
    expect_type(tx, kind)?;
    Ok(MultiSigRecovery { raw: tx.clone() })
}

pub fn build_propose_recovery_address(
    tx: &RawTransaction,
) -> Result<MultiSigProposeRecoveryAddress> {
    expect_type(tx, TxType::MultiSigProposeRecoveryAddress)?;
    Ok(MultiSigProposeRecoveryAddress {
        raw: tx.clone(),
        recovery_address: required(
            &tx.metadata,
            metadata::RECOVERY_ADDRESS,
            Metadata::get_address,
        )?,
    })
}

pub fn build_sign_recovery_address(tx: &RawTransaction) -> Result<MultiSigSignRecoveryAddress> {
    expect_type(tx, TxType::MultiSigSignRecoveryAddress)?;
    Ok(MultiSigSignRecoveryAddress {
        raw: tx.clone(),
        proposal_id: required(&tx.metadata, metadata::PROPOSAL_ID, Metadata::get_bytes32)?,
    })
}

fn expect_type(tx: &RawTransaction, expected: TxType) -> Result<()> {
    if tx.tx_type == expected {
        Ok(())
    } else {
        Err(DecodeError::TypeMismatch {
            expected,
            got: tx.tx_type,
        })
    }
}

fn required<T>(
    meta: &Metadata,
    key: &str,
    get: impl FnOnce(&Metadata, &str) -> Result<T>,
) -> Result<T> {
    get(meta, key).map_err(|err| DecodeError::field(key, err))
}

/// Missing or nil keys take `default`; a value of the wrong type still fails.
fn optional<T>(
    meta: &Metadata,
    key: &str,
    get: impl FnOnce(&Metadata, &str) -> Result<T>,
    default: T,
) -> Result<T> {
    match get(meta, key) {
        Ok(value) => Ok(value),
        Err(DecodeError::ArgumentMissing { .. } | DecodeError::ArgumentNilValue { .. }) => {
            Ok(default)
        }
        Err(err) => Err(DecodeError::field(key, err)),
    }
}

fn token_details(meta: &Metadata) -> Result<(String, u8)> {
    let symbol = optional(
        meta,
        metadata::TOKEN_SYMBOL,
        Metadata::get_string,
        DEFAULT_TOKEN_SYMBOL.to_string(),
    )?;
    let decimals = optional(
        meta,
        metadata::TOKEN_DECIMALS,
        |m, k| {
            let raw = m.get_uint64(k)?;
            u8::try_from(raw).map_err(|_| DecodeError::ArgumentTypeMismatch {
                key: k.to_string(),
                expected: "uint8",
                got: raw.to_string(),
            })
        },
        DEFAULT_TOKEN_DECIMALS,
    )?;
    Ok((symbol, decimals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain::{ChainAddress, ChainType};
    use crate::domain::tx::metadata::MetaValue;
    use alloy_primitives::{Address, Bytes, B256, U256};

    fn raw(tx_type: TxType) -> RawTransaction {
        RawTransaction {
            hash: B256::repeat_byte(0x11),
            chain: ChainType::Ethereum,
            from: ChainAddress::new(ChainType::Ethereum, Address::repeat_byte(0x01)),
            to: Some(ChainAddress::new(ChainType::Ethereum, Address::repeat_byte(0x02))),
            value: U256::ZERO,
            data: Bytes::new(),
            nonce: 0,
            gas_limit: 21_000,
            gas_price: U256::from(1u64),
            block_number: None,
            metadata: Metadata::new(),
            tx_type,
        }
    }

    fn addr(byte: u8) -> ChainAddress {
        ChainAddress::new(ChainType::Ethereum, Address::repeat_byte(byte))
    }

    #[test]
    fn test_type_guard() {
        let tx = raw(TxType::Erc20Transfer);
        let err = build_sign_withdrawal(&tx).unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { .. }));
    }

    #[test]
    fn test_erc20_round_trip_with_defaults() {
        let mut tx = raw(TxType::Erc20Transfer);
        tx.metadata.insert_once(metadata::TOKEN_ADDRESS, addr(0x02)).unwrap();
        tx.metadata.insert_once(metadata::RECIPIENT, addr(0x03)).unwrap();
        tx.metadata
            .insert_once(metadata::AMOUNT, U256::from(100_000u64))
            .unwrap();

        let typed = build_erc20_transfer(&tx).unwrap();
        assert_eq!(typed.token_address, addr(0x02));
        assert_eq!(typed.recipient, addr(0x03));
        assert_eq!(typed.amount, U256::from(100_000u64));
        assert_eq!(typed.token_symbol, "");
        assert_eq!(typed.token_decimals, 18);
        assert_eq!(typed.raw, tx);
    }

    #[test]
    fn test_missing_required_field_named() {
        let tx = raw(TxType::MultiSigSignWithdrawal);
        let err = build(&tx).unwrap_err();
        assert_eq!(err.to_string(), "missing/invalid field: request_id");
    }

    #[test]
    fn test_wrong_typed_optional_fails() {
        let mut tx = raw(TxType::MultiSigAddSupportedToken);
        tx.metadata.insert_once(metadata::TOKEN_ADDRESS, addr(0x05)).unwrap();
        tx.metadata.insert_once(metadata::TOKEN_DECIMALS, 300u64).unwrap();
        let err = build(&tx).unwrap_err();
        assert_eq!(err.to_string(), "missing/invalid field: token_decimals");
    }

    #[test]
    fn test_withdrawal_request_round_trip() {
        let mut tx = raw(TxType::MultiSigWithdrawalRequest);
        tx.metadata.insert_once(metadata::TOKEN_ADDRESS, addr(0x0a)).unwrap();
        tx.metadata.insert_once(metadata::RECIPIENT, addr(0x0b)).unwrap();
        tx.metadata.insert_once(metadata::AMOUNT, U256::from(5u64)).unwrap();
        tx.metadata.insert_once(metadata::WITHDRAWAL_NONCE, 42u64).unwrap();
        tx.metadata.insert_once(metadata::TOKEN_SYMBOL, "USDT").unwrap();
        tx.metadata.insert_once(metadata::TOKEN_DECIMALS, 6u64).unwrap();

        let TypedTransaction::MultiSigWithdrawalRequest(req) = build(&tx).unwrap() else {
            panic!("expected withdrawal request");
        };
        assert_eq!(req.token_address, addr(0x0a));
        assert_eq!(req.recipient, addr(0x0b));
        assert_eq!(req.amount, U256::from(5u64));
        assert_eq!(req.withdrawal_nonce, 42);
        assert_eq!(req.token_symbol, "USDT");
        assert_eq!(req.token_decimals, 6);
    }

    #[test]
    fn test_recovery_variants_need_no_metadata() {
        for kind in [
            TxType::MultiSigRecoveryRequest,
            TxType::MultiSigCancelRecovery,
            TxType::MultiSigExecuteRecovery,
        ] {
            let typed = build(&raw(kind)).unwrap();
            assert_eq!(typed.tx_type(), kind);
        }
    }

    #[test]
    fn test_native_and_deploy() {
        let mut transfer = raw(TxType::NativeTransfer);
        transfer.value = U256::from(10u64);
        let TypedTransaction::NativeTransfer(native) = build(&transfer).unwrap() else {
            panic!("expected native transfer");
        };
        assert_eq!(native.amount, U256::from(10u64));
        assert_eq!(native.recipient, addr(0x02));

        let mut deploy = raw(TxType::ContractDeploy);
        deploy.to = None;
        deploy
            .metadata
            .insert_once(metadata::CONTRACT_ADDRESS, MetaValue::Null)
            .unwrap();
        let TypedTransaction::ContractDeploy(deployed) = build(&deploy).unwrap() else {
            panic!("expected deploy");
        };
        assert_eq!(deployed.contract_address, None);
    }

    #[test]
    fn test_untyped_passes_through() {
        let tx = raw(TxType::ContractCall);
        assert_eq!(build(&tx).unwrap(), TypedTransaction::Untyped(tx));
    }
}
