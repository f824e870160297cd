//! Precomputed 4-byte selectors for the methods the classifier recognises

use std::sync::LazyLock;

use alloy_primitives::keccak256;

use crate::domain::tx::TxType;

/// 4-byte method identifier
pub type Selector = [u8; 4];

pub const ERC20_TRANSFER_SIGNATURE: &str = "transfer(address,uint256)";
pub const IMPLEMENTATION_SIGNATURE: &str = "implementation()";

/// `transfer(address,uint256)` = 0xa9059cbb
pub static ERC20_TRANSFER: LazyLock<Selector> =
    LazyLock::new(|| selector_of(ERC20_TRANSFER_SIGNATURE));

/// `implementation()` = 0x5c60da1b
pub static IMPLEMENTATION: LazyLock<Selector> =
    LazyLock::new(|| selector_of(IMPLEMENTATION_SIGNATURE));

/// A MultiSig wallet method the classifier knows how to type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSigMethod {
    pub tx_type: TxType,
    pub name: &'static str,
    pub signature: &'static str,
    pub selector: Selector,
}

const MULTISIG_SIGNATURES: [(TxType, &str, &str); 10] = [
    (
        TxType::MultiSigWithdrawalRequest,
        "requestWithdrawal",
        "requestWithdrawal(address,address,uint256,uint256)",
    ),
    (
        TxType::MultiSigSignWithdrawal,
        "signWithdrawal",
        "signWithdrawal(bytes32)",
    ),
    (
        TxType::MultiSigExecuteWithdrawal,
        "executeWithdrawal",
        "executeWithdrawal(bytes32)",
    ),
    (
        TxType::MultiSigAddSupportedToken,
        "addSupportedToken",
        "addSupportedToken(address)",
    ),
    (
        TxType::MultiSigRemoveSupportedToken,
        "removeSupportedToken",
        "removeSupportedToken(address)",
    ),
    (
        TxType::MultiSigRecoveryRequest,
        "requestRecovery",
        "requestRecovery()",
    ),
    (
        TxType::MultiSigCancelRecovery,
        "cancelRecovery",
        "cancelRecovery()",
    ),
    (
        TxType::MultiSigExecuteRecovery,
        "executeRecovery",
        "executeRecovery()",
    ),
    (
        TxType::MultiSigProposeRecoveryAddress,
        "proposeRecoveryAddress",
        "proposeRecoveryAddress(address)",
    ),
    (
        TxType::MultiSigSignRecoveryAddress,
        "signRecoveryAddress",
        "signRecoveryAddress(bytes32)",
    ),
];

pub static MULTISIG_METHODS: LazyLock<Vec<MultiSigMethod>> = LazyLock::new(|| {
    MULTISIG_SIGNATURES
        .iter()
        .map(|&(tx_type, name, signature)| MultiSigMethod {
            tx_type,
            name,
            signature,
            selector: selector_of(signature),
        })
        .collect()
});

/// Find the MultiSig method whose selector equals `selector`
pub fn multisig_method(selector: Selector) -> Option<&'static MultiSigMethod> {
    MULTISIG_METHODS.iter().find(|m| m.selector == selector)
}

/// Compute the 4-byte function selector from a canonical signature
pub fn selector_of(signature: &str) -> Selector {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

pub fn selector_hex(selector: Selector) -> String {
    format!("0x{}", hex::encode(selector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_erc20_transfer_selector() {
        assert_eq!(*ERC20_TRANSFER, [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector_hex(*ERC20_TRANSFER), "0xa9059cbb");
    }

    #[test]
    fn test_implementation_selector() {
        assert_eq!(selector_hex(*IMPLEMENTATION), "0x5c60da1b");
    }

    #[test]
    fn test_multisig_selectors_match_keccak() {
        for method in MULTISIG_METHODS.iter() {
            let hash = keccak256(method.signature.as_bytes());
            assert_eq!(method.selector[..], hash[..4], "{}", method.signature);
            assert!(method.signature.starts_with(method.name));
        }
    }

    #[test]
    fn test_multisig_selectors_distinct() {
        let unique: HashSet<_> = MULTISIG_METHODS.iter().map(|m| m.selector).collect();
        assert_eq!(unique.len(), MULTISIG_METHODS.len());
        assert!(!unique.contains(&*ERC20_TRANSFER));
    }

    #[test]
    fn test_lookup_by_selector() {
        let sel = selector_of("signWithdrawal(bytes32)");
        let method = multisig_method(sel).unwrap();
        assert_eq!(method.tx_type, TxType::MultiSigSignWithdrawal);
        assert!(multisig_method([0xde, 0xad, 0xbe, 0xef]).is_none());
    }
}
