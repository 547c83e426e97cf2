use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::Address;
use parking_lot::RwLock;
use vmeet_common::fmt::TruncatedHex;
use vmeet_cryptography::signature::h160addr_to_string;

use super::{MeetingContract, VerifierError};
use crate::{MeetingIdentifier, MessageHash};

type SignerRegistry = HashMap<MeetingIdentifier, HashSet<Address>>;

/// In-process deployment of the verification contract.
///
/// Behaves exactly like the on-chain contract: the deployer becomes the owner, only the owner
/// may register signers, and registrations are append-only. Handles created with
/// [`LocalVerifyContract::connect`] share the same registry, the way several clients talk to
/// one deployed address.
#[derive(Debug, Clone)]
pub struct LocalVerifyContract {
    owner: Address,
    sender: Address,
    registry: Arc<RwLock<SignerRegistry>>,
}

impl LocalVerifyContract {
    pub fn deploy(owner: Address) -> Self {
        tracing::debug!(owner = %h160addr_to_string(owner), "deployed local verify contract");
        Self {
            owner,
            sender: owner,
            registry: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// A handle to the same deployment that sends calls as `sender`
    pub fn connect(&self, sender: Address) -> Self {
        Self {
            owner: self.owner,
            sender,
            registry: self.registry.clone(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    pub fn authorized_signers(&self, identifier: &MeetingIdentifier) -> HashSet<Address> {
        self.registry
            .read()
            .get(identifier)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_authorized(&self, identifier: &MeetingIdentifier, address: &Address) -> bool {
        self.registry
            .read()
            .get(identifier)
            .is_some_and(|signers| signers.contains(address))
    }
}

#[async_trait]
impl MeetingContract for LocalVerifyContract {
    async fn get_message_hash(
        &self,
        identifier: &MeetingIdentifier,
    ) -> Result<MessageHash, VerifierError> {
        Ok(MessageHash::of(identifier))
    }

    async fn verify(
        &self,
        identifier: &MeetingIdentifier,
        signature: &[u8],
    ) -> Result<bool, VerifierError> {
        let hash = MessageHash::of(identifier);
        let signer = match hash.recover_signer(signature) {
            Ok(signer) => signer,
            Err(err) => {
                tracing::debug!(
                    meeting = %identifier,
                    signature = %signature.short_hex(),
                    "signer recovery failed: {err}"
                );
                return Ok(false);
            }
        };

        let authorized = self.is_authorized(identifier, &signer);
        tracing::debug!(
            meeting = %identifier,
            signer = %h160addr_to_string(signer),
            authorized,
            "verified meeting signature"
        );
        Ok(authorized)
    }

    async fn map_identifier_to_signers(
        &self,
        identifier: &MeetingIdentifier,
        signers: &[Address],
    ) -> Result<(), VerifierError> {
        if self.sender != self.owner {
            return Err(VerifierError::NotOwner {
                sender: self.sender,
            });
        }

        let mut registry = self.registry.write();
        let authorized = registry.entry(identifier.clone()).or_default();
        for signer in signers {
            if authorized.insert(*signer) {
                tracing::info!(
                    meeting = %identifier,
                    signer = %h160addr_to_string(*signer),
                    "authorized signer"
                );
            }
        }

        Ok(())
    }
}
