use std::sync::Arc;

use async_trait::async_trait;
use ethers::contract::abigen;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Bytes};
use vmeet_common::fmt::TruncatedHex;
use vmeet_cryptography::signature::h160addr_to_string;

use super::{MeetingContract, VerifierError};
use crate::{MeetingIdentifier, MessageHash};

abigen!(VerifySignature, "artifact/VerifySignature.json");

pub type RpcClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// The verification contract deployed on an EVM chain, reached over JSON-RPC.
///
/// Every call is sent from `wallet`. Reads work with any wallet. Registrations need the owner
/// key and fail with [`VerifierError::NotOwner`] before anything is sent otherwise.
#[derive(Debug, Clone)]
pub struct RpcVerifyContract {
    contract: VerifySignature<RpcClient>,
}

impl RpcVerifyContract {
    pub fn new(
        url: &str,
        contract_address: Address,
        wallet: LocalWallet,
        chain_id: u64,
    ) -> Result<Self, VerifierError> {
        let provider = Provider::<Http>::try_from(url)?;
        let client = SignerMiddleware::new(provider, wallet.with_chain_id(chain_id));
        Ok(Self::with_client(contract_address, Arc::new(client)))
    }

    /// Like [`RpcVerifyContract::new`], asking the node for its chain id
    pub async fn connect(
        url: &str,
        contract_address: Address,
        wallet: LocalWallet,
    ) -> Result<Self, VerifierError> {
        let provider = Provider::<Http>::try_from(url)?;
        let chain_id = provider
            .get_chainid()
            .await
            .map_err(VerifierError::transport)?;
        tracing::debug!(%url, chain_id = chain_id.as_u64(), "connected to rpc node");
        Self::new(url, contract_address, wallet, chain_id.as_u64())
    }

    pub fn with_client(contract_address: Address, client: Arc<RpcClient>) -> Self {
        Self {
            contract: VerifySignature::new(contract_address, client),
        }
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    /// The account calls are sent from
    pub fn sender(&self) -> Address {
        self.contract.client().address()
    }

    pub async fn owner(&self) -> Result<Address, VerifierError> {
        self.contract
            .owner()
            .call()
            .await
            .map_err(VerifierError::transport)
    }

    /// Signer recovery as performed on-chain, given the EIP-191 prefixed hash
    pub async fn recover_signer(
        &self,
        eth_signed_message_hash: [u8; 32],
        signature: &[u8],
    ) -> Result<Address, VerifierError> {
        self.contract
            .recover_signer(eth_signed_message_hash, Bytes::from(signature.to_vec()))
            .call()
            .await
            .map_err(VerifierError::transport)
    }
}

#[async_trait]
impl MeetingContract for RpcVerifyContract {
    async fn get_message_hash(
        &self,
        identifier: &MeetingIdentifier,
    ) -> Result<MessageHash, VerifierError> {
        let hash: [u8; 32] = self
            .contract
            .get_message_hash(identifier.to_string())
            .call()
            .await
            .map_err(VerifierError::transport)?;
        Ok(hash.into())
    }

    async fn verify(
        &self,
        identifier: &MeetingIdentifier,
        signature: &[u8],
    ) -> Result<bool, VerifierError> {
        let is_valid = self
            .contract
            .verify(identifier.to_string(), Bytes::from(signature.to_vec()))
            .call()
            .await
            .map_err(VerifierError::transport)?;
        tracing::debug!(
            meeting = %identifier,
            signature = %signature.short_hex(),
            is_valid,
            "on-chain verification"
        );
        Ok(is_valid)
    }

    async fn map_identifier_to_signers(
        &self,
        identifier: &MeetingIdentifier,
        signers: &[Address],
    ) -> Result<(), VerifierError> {
        let sender = self.sender();
        if sender != self.owner().await? {
            return Err(VerifierError::NotOwner { sender });
        }

        let call = self
            .contract
            .map_string_to_public_key(identifier.to_string(), signers.to_vec());
        let pending = call.send().await.map_err(VerifierError::transport)?;
        let receipt = pending
            .await
            .map_err(VerifierError::transport)?
            .ok_or(VerifierError::TransactionDropped)?;

        tracing::info!(
            meeting = %identifier,
            signers = ?signers.iter().map(|s| h160addr_to_string(*s)).collect::<Vec<_>>(),
            tx = ?receipt.transaction_hash,
            "authorized signers on-chain"
        );
        Ok(())
    }
}
