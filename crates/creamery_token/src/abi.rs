//! # Bridge Payload Codec
//!
//! The bridge relays deposits with the amount ABI-encoded as a single
//! `uint256` word, the same bytes `abi.encode(amount)` produces on the
//! root chain.

use alloy_primitives::U256;
use alloy_sol_types::{sol_data, SolType};

use crate::error::{TokenError, TokenResult};

type DepositData = sol_data::Uint<256>;

/// Decodes a bridge deposit payload into an amount.
///
/// # Errors
///
/// `InvalidDepositData` if the payload is not exactly one ABI word.
pub fn decode_deposit_amount(data: &[u8]) -> TokenResult<U256> {
    if data.len() != 32 {
        return Err(TokenError::InvalidDepositData(format!(
            "expected 32 bytes, got {}",
            data.len()
        )));
    }
    DepositData::abi_decode(data, true).map_err(|e| TokenError::InvalidDepositData(e.to_string()))
}

/// Encodes an amount as a bridge deposit payload.
#[must_use]
pub fn encode_deposit_amount(amount: U256) -> Vec<u8> {
    DepositData::abi_encode(&amount)
}
