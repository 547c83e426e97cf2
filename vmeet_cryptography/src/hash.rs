use sha3::{Digest, Keccak256};

pub const HASH_LEN: usize = 32;

/// Prefix prepended by `personal_sign` so a signed message can never be replayed as a transaction
pub const EIP191_PREFIX: &str = "\x19Ethereum Signed Message:\n";

pub fn keccak256(msg: impl AsRef<[u8]>) -> [u8; HASH_LEN] {
    let k = Keccak256::digest(msg.as_ref());

    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(k.as_slice());
    out
}

/// EIP-191 personal message hash: keccak256("\x19Ethereum Signed Message:\n{len}" || message)
pub fn hash_personal(message: impl AsRef<[u8]>) -> [u8; HASH_LEN] {
    let message = message.as_ref();
    let mut hasher = Keccak256::new();
    hasher.update(EIP191_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);

    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(hasher.finalize().as_slice());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_known_value() {
        // keccak256("") is a well known constant
        assert_eq!(
            hex::encode(keccak256("")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_hash_personal_matches_ethers() {
        let message = "test message";
        let hash = hash_personal(message);
        assert_eq!(hash, ethers::utils::hash_message(message).0);

        // Should be deterministic
        assert_eq!(hash, hash_personal(message));
        assert_ne!(hash, hash_personal("different message"));
    }

    #[test]
    fn test_hash_personal_of_digest() {
        let digest = keccak256("ABCD-EFGH-IJKL");
        assert_eq!(
            hash_personal(digest),
            ethers::utils::hash_message(digest).0
        );
    }
}
