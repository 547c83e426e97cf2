use ethers::types::{Address, Signature as EthersSignature, H256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hash::{hash_personal, HASH_LEN};

pub const SIGNATURE_LEN: usize = 65;

#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("Bad address format")]
    BadAddressFormat(#[from] rustc_hex::FromHexError),
    #[error("supplied signature is not in the proper format")]
    BadSignatureFormat(#[from] ethers::types::SignatureError),
    #[error("signature must be 65 bytes, got {0}")]
    BadLength(usize),
    #[error("recovery id {0} is not one of 0, 1, 27 or 28")]
    BadRecoveryId(u8),
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub enum RecoverableSignature {
    // 65 byte r || s || v signature produced by `personal_sign`. The recovery id may be
    // encoded either as 0/1 or as 27/28.
    Eip191Signature(Vec<u8>),
}

impl RecoverableSignature {
    /// Recover the signer of `predigest_message`, applying the EIP-191 prefix
    pub fn recover_address(
        &self,
        predigest_message: impl AsRef<[u8]>,
    ) -> Result<Address, SignatureError> {
        self.recover_from_digest(hash_personal(predigest_message))
    }

    /// Recover the signer of an already hashed (and prefixed) 32 byte digest.
    ///
    /// Only 0/1 and 27/28 recovery ids are accepted. EIP-155 style ids (35 and up) would be
    /// normalized by ethers, but `ecrecover` rejects them, so they are rejected here too.
    pub fn recover_from_digest(&self, digest: [u8; HASH_LEN]) -> Result<Address, SignatureError> {
        match self {
            Self::Eip191Signature(signature_bytes) => {
                if signature_bytes.len() != SIGNATURE_LEN {
                    return Err(SignatureError::BadLength(signature_bytes.len()));
                }
                let v = signature_bytes[SIGNATURE_LEN - 1];
                if !matches!(v, 0 | 1 | 27 | 28) {
                    return Err(SignatureError::BadRecoveryId(v));
                }
                let signature = EthersSignature::try_from(signature_bytes.as_slice())?;
                Ok(signature.recover(H256::from(digest))?)
            }
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Eip191Signature(bytes) => bytes,
        }
    }
}

impl From<Vec<u8>> for RecoverableSignature {
    fn from(value: Vec<u8>) -> Self {
        RecoverableSignature::Eip191Signature(value)
    }
}

impl From<RecoverableSignature> for Vec<u8> {
    fn from(value: RecoverableSignature) -> Self {
        match value {
            RecoverableSignature::Eip191Signature(bytes) => bytes,
        }
    }
}

impl From<EthersSignature> for RecoverableSignature {
    fn from(value: EthersSignature) -> Self {
        RecoverableSignature::Eip191Signature(value.to_vec())
    }
}

pub fn h160addr_to_string(bytes: Address) -> String {
    let mut s = String::from("0x");
    s.push_str(&hex::encode(bytes));
    s.to_lowercase()
}

/// EIP-55 mixed-case form of `address`, as wallets display it
pub fn checksummed(address: Address) -> String {
    ethers::utils::to_checksum(&address, None)
}

/// Check if an string is a valid ethereum address (valid hex and length 20).
pub fn is_valid_ethereum_address<S: AsRef<str>>(address: S) -> bool {
    let address = address.as_ref();
    let address = address.strip_prefix("0x").unwrap_or(address);

    if address.len() != 40 {
        return false;
    }

    address.chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Debug, Error)]
pub enum IdentifierValidationError {
    #[error("invalid addresses: {0:?}")]
    InvalidAddresses(Vec<String>),
    #[error("address is invalid hex address")]
    HexDecode(#[from] rustc_hex::FromHexError),
}

pub fn sanitize_evm_addresses(
    account_addresses: &[impl AsRef<str>],
) -> Result<Vec<String>, IdentifierValidationError> {
    let mut invalid = account_addresses
        .iter()
        .filter(|a| !is_valid_ethereum_address(a))
        .peekable();

    if invalid.peek().is_some() {
        return Err(IdentifierValidationError::InvalidAddresses(
            invalid
                .map(|addr| addr.as_ref().to_string())
                .collect::<Vec<_>>(),
        ));
    }

    Ok(account_addresses
        .iter()
        .map(|addr| addr.as_ref().to_lowercase())
        .collect())
}

/// Parse a single address, accepting any letter case
pub fn parse_address(address: impl AsRef<str>) -> Result<Address, IdentifierValidationError> {
    let address = address.as_ref().trim();
    if !is_valid_ethereum_address(address) {
        return Err(IdentifierValidationError::InvalidAddresses(vec![
            address.to_string()
        ]));
    }
    Ok(address.to_lowercase().parse::<Address>()?)
}
