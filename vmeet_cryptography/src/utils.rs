use ethers::signers::{LocalWallet, WalletError};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

pub fn rng() -> impl CryptoRng + RngCore {
    ChaCha20Rng::from_entropy()
}

pub fn seeded_rng(seed: u64) -> impl CryptoRng + RngCore {
    ChaCha20Rng::seed_from_u64(seed)
}

pub fn generate_local_wallet() -> LocalWallet {
    LocalWallet::new(&mut rng())
}

/// Parse a hex encoded secp256k1 private key, with or without the `0x` prefix
pub fn wallet_from_hex(private_key: impl AsRef<str>) -> Result<LocalWallet, WalletError> {
    private_key.as_ref().trim().parse::<LocalWallet>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::signers::Signer;

    #[test]
    fn test_wallet_from_hex() {
        // anvil/hardhat account #0
        let key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        let wallet = wallet_from_hex(key).unwrap();
        assert_eq!(
            format!("{:?}", wallet.address()),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );

        let unprefixed = wallet_from_hex(&key[2..]).unwrap();
        assert_eq!(unprefixed.address(), wallet.address());
    }

    #[test]
    fn test_wallet_from_bad_hex() {
        assert!(wallet_from_hex("not a key").is_err());
        assert!(wallet_from_hex("0x").is_err());
    }

    #[test]
    fn test_seeded_wallets_are_stable() {
        let a = LocalWallet::new(&mut seeded_rng(7));
        let b = LocalWallet::new(&mut seeded_rng(7));
        assert_eq!(a.address(), b.address());
        assert_ne!(a.address(), generate_local_wallet().address());
    }
}
