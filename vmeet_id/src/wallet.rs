use std::sync::Arc;

use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use thiserror::Error;
use vmeet_cryptography::signature::{h160addr_to_string, RecoverableSignature};

use crate::MessageHash;

#[derive(Debug, Error)]
pub enum WalletProviderError {
    #[error("the signature request was rejected")]
    Rejected,
    #[error("wallet provider unavailable: {0}")]
    Unavailable(String),
}

/// The user's wallet, as seen by the join flow.
///
/// Implementations may suspend for user approval. A declined prompt is
/// [`WalletProviderError::Rejected`]; everything else that keeps the wallet from answering is
/// [`WalletProviderError::Unavailable`].
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// The account the user connected with
    async fn request_accounts(&self) -> Result<Address, WalletProviderError>;

    /// `personal_sign` of the raw digest bytes with `address`'s key
    async fn personal_sign(
        &self,
        address: Address,
        digest: &MessageHash,
    ) -> Result<RecoverableSignature, WalletProviderError>;
}

#[async_trait]
impl WalletProvider for LocalWallet {
    async fn request_accounts(&self) -> Result<Address, WalletProviderError> {
        Ok(self.address())
    }

    async fn personal_sign(
        &self,
        address: Address,
        digest: &MessageHash,
    ) -> Result<RecoverableSignature, WalletProviderError> {
        if address != self.address() {
            return Err(WalletProviderError::Unavailable(format!(
                "account {} is not managed by this wallet",
                h160addr_to_string(address)
            )));
        }

        let signature = self
            .sign_message(digest.as_bytes())
            .await
            .map_err(|e| WalletProviderError::Unavailable(e.to_string()))?;
        Ok(signature.into())
    }
}

#[async_trait]
impl<T> WalletProvider for Arc<T>
where
    T: WalletProvider + ?Sized,
{
    async fn request_accounts(&self) -> Result<Address, WalletProviderError> {
        (**self).request_accounts().await
    }

    async fn personal_sign(
        &self,
        address: Address,
        digest: &MessageHash,
    ) -> Result<RecoverableSignature, WalletProviderError> {
        (**self).personal_sign(address, digest).await
    }
}
