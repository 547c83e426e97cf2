//! The signing challenge handed out for a meeting.
use std::fmt;

use ethers::types::Address;
use vmeet_cryptography::hash::{hash_personal, keccak256, HASH_LEN};
use vmeet_cryptography::signature::{RecoverableSignature, SignatureError};

use crate::MeetingIdentifier;

/// `keccak256` of the meeting identifier. This is the digest a participant signs with
/// `personal_sign`; it is recomputed on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHash([u8; HASH_LEN]);

impl MessageHash {
    pub fn of(identifier: &MeetingIdentifier) -> Self {
        Self(keccak256(identifier.as_str()))
    }

    /// The EIP-191 form of this hash: what `personal_sign` actually signs and what signer
    /// recovery runs against.
    pub fn eth_signed(&self) -> [u8; HASH_LEN] {
        hash_personal(self.0)
    }

    /// Recover the address that signed this hash with `personal_sign`
    pub fn recover_signer(&self, signature: &[u8]) -> Result<Address, SignatureError> {
        RecoverableSignature::from(signature.to_vec()).recover_from_digest(self.eth_signed())
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl From<[u8; HASH_LEN]> for MessageHash {
    fn from(value: [u8; HASH_LEN]) -> Self {
        Self(value)
    }
}

impl From<MessageHash> for [u8; HASH_LEN] {
    fn from(value: MessageHash) -> Self {
        value.0
    }
}

impl AsRef<[u8]> for MessageHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for MessageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::signers::{LocalWallet, Signer};
    use vmeet_common::rand_string;

    fn id(s: &str) -> MeetingIdentifier {
        MeetingIdentifier::new(s).unwrap()
    }

    #[test]
    fn hash_is_deterministic() {
        for _ in 0..20 {
            let m = id(&rand_string::<14>());
            assert_eq!(MessageHash::of(&m), MessageHash::of(&m));
        }
        assert_ne!(
            MessageHash::of(&id("ABCD-EFGH-IJKL")),
            MessageHash::of(&id("ZZZZ-ZZZZ-ZZZZ"))
        );
    }

    #[test]
    fn hash_matches_solidity_keccak_of_string() {
        // keccak256(abi.encodePacked(_message)) is keccak over the raw utf8 bytes
        let m = id("ABCD-EFGH-IJKL");
        assert_eq!(
            MessageHash::of(&m).as_bytes(),
            &ethers::utils::keccak256("ABCD-EFGH-IJKL".as_bytes())
        );
    }

    #[test]
    fn display_is_prefixed_hex() {
        let hash = MessageHash::from([0xab; 32]);
        assert_eq!(hash.to_string(), format!("0x{}", "ab".repeat(32)));
    }

    #[tokio::test]
    async fn recovers_personal_sign_signer() {
        let wallet = LocalWallet::new(&mut rand::thread_rng());
        let hash = MessageHash::of(&id("ABCD-EFGH-IJKL"));

        let signature = wallet.sign_message(hash.as_bytes()).await.unwrap();
        assert_eq!(
            hash.recover_signer(&signature.to_vec()).unwrap(),
            wallet.address()
        );
    }

    #[tokio::test]
    async fn other_hash_recovers_other_address() {
        let wallet = LocalWallet::new(&mut rand::thread_rng());
        let signed = MessageHash::of(&id("ABCD-EFGH-IJKL"));
        let other = MessageHash::of(&id("ZZZZ-ZZZZ-ZZZZ"));

        let signature = wallet.sign_message(signed.as_bytes()).await.unwrap();
        // recovery of a signature over a different digest yields an unrelated key
        let recovered = other.recover_signer(&signature.to_vec());
        assert!(recovered.map_or(true, |addr| addr != wallet.address()));
    }

    #[test]
    fn malformed_signature_fails_recovery() {
        let hash = MessageHash::of(&id("ABCD-EFGH-IJKL"));
        assert!(hash.recover_signer(&[]).is_err());
        assert!(hash.recover_signer(&[0u8; 10]).is_err());
    }
}
