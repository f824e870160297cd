//! ABI decoder implementation using alloy-dyn-abi

use alloy_dyn_abi::{DynSolType, DynSolValue};

use crate::domain::abi::{AbiDecoder, ContractAbi, DecodedArgs, DecodedValue, Method};
use crate::domain::selectors::{selector_hex, Selector};
use crate::error::{DecodeError, Result};

const WORD: usize = 32;

/// ABI decoder implementation using alloy-dyn-abi
#[derive(Debug, Default, Clone, Copy)]
pub struct AlloyAbiDecoder;

impl AlloyAbiDecoder {
    pub fn new() -> Self {
        Self
    }
}

/// Leading 4-byte selector of call data
pub fn extract_selector(data: &[u8]) -> Result<Selector> {
    data.get(..4)
        .and_then(|s| s.try_into().ok())
        .ok_or(DecodeError::PayloadTooShort { len: data.len() })
}

impl AbiDecoder for AlloyAbiDecoder {
    fn decode_arguments(
        &self,
        abi: &ContractAbi,
        method: Option<&str>,
        data: &[u8],
    ) -> Result<DecodedArgs> {
        let selector = extract_selector(data)?;

        let function = match method {
            Some(name) => match abi.method_by_name_and_selector(name, selector) {
                Some(function) => function,
                None => {
                    let first = abi.method_by_name(name).ok_or_else(|| {
                        DecodeError::MethodNotFound {
                            method: name.to_string(),
                        }
                    })?;
                    return Err(DecodeError::SelectorMismatch {
                        method: name.to_string(),
                        expected: hex::encode(first.selector),
                        got: hex::encode(selector),
                    });
                }
            },
            None => abi
                .method_by_selector(selector)
                .ok_or_else(|| DecodeError::MethodNotFound {
                    method: selector_hex(selector),
                })?,
        };

        let args_data = &data[4..];
        check_payload_shape(function, args_data)?;
        decode_inputs(function, args_data)
    }
}

/// The argument block must be empty (zero-argument methods only) or whole words.
fn check_payload_shape(function: &Method, args_data: &[u8]) -> Result<()> {
    if args_data.is_empty() {
        if function.inputs.is_empty() {
            return Ok(());
        }
        return Err(DecodeError::PayloadTooShort { len: 0 });
    }
    if args_data.len() % WORD != 0 {
        return Err(DecodeError::PayloadLengthInvalid {
            len: args_data.len(),
        });
    }
    // Static heads alone already need one word per input
    if args_data.len() < function.inputs.len() * WORD {
        return Err(DecodeError::PayloadTooShort {
            len: args_data.len(),
        });
    }
    Ok(())
}

fn decode_inputs(function: &Method, args_data: &[u8]) -> Result<DecodedArgs> {
    let mut args = DecodedArgs::new(function.name.clone());
    if function.inputs.is_empty() {
        return Ok(args);
    }

    // Parse types from method inputs
    let types: Vec<DynSolType> = function
        .inputs
        .iter()
        .map(|param| {
            param
                .kind
                .parse::<DynSolType>()
                .map_err(|e| DecodeError::AbiDecodeFailed {
                    reason: format!(
                        "failed to parse type '{}' for param '{}': {e}",
                        param.kind, param.name
                    ),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let decoded = DynSolType::Tuple(types)
        .abi_decode_params(args_data)
        .map_err(|e| DecodeError::AbiDecodeFailed {
            reason: format!("{}: {e}", function.signature),
        })?;

    // Extract individual values from the tuple
    let values = match decoded {
        DynSolValue::Tuple(values) => values,
        other => vec![other],
    };

    for (param, value) in function.inputs.iter().zip(values) {
        args.push(&param.name, normalize(value));
    }
    Ok(args)
}

/// Convert a decoded `DynSolValue` into a `DecodedValue`
fn normalize(value: DynSolValue) -> DecodedValue {
    match value {
        DynSolValue::Bool(b) => DecodedValue::Bool(b),
        DynSolValue::Int(value, bits) => DecodedValue::Int { value, bits },
        DynSolValue::Uint(value, bits) => DecodedValue::Uint { value, bits },
        DynSolValue::FixedBytes(word, size) => DecodedValue::FixedBytes { word, size },
        DynSolValue::Address(addr) => DecodedValue::Address(addr),
        DynSolValue::Bytes(bytes) => DecodedValue::Bytes(bytes),
        DynSolValue::String(s) => DecodedValue::String(s),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            DecodedValue::Array(items.into_iter().map(normalize).collect())
        }
        DynSolValue::Tuple(fields) => {
            DecodedValue::Tuple(fields.into_iter().map(normalize).collect())
        }
        // External function pointers have no meaning for classification
        _ => DecodedValue::Null,
    }
}
