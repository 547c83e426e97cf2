//! Access to the `VerifySignature` contract: the challenge issuer, the signature verifier and
//! the owner-only signer registry.
mod local;
mod rpc;

use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::Address;
use thiserror::Error;

use crate::{MeetingIdentifier, MessageHash};

pub use self::local::*;
pub use self::rpc::*;

#[derive(Debug, Error)]
pub enum VerifierError {
    /// The call never produced a result. The underlying error is kept as the source.
    #[error("contract call failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("{sender:?} is not the contract owner")]
    NotOwner { sender: Address },
    #[error("registration transaction was dropped from the mempool")]
    TransactionDropped,
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl VerifierError {
    pub(crate) fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport(Box::new(err))
    }
}

/// Remote operations exposed by the deployed verification contract.
///
/// A `VerifierError` always means the call did not complete; a signature that does not belong
/// to an authorized signer is `Ok(false)`.
#[async_trait]
pub trait MeetingContract: Send + Sync {
    /// Challenge issuer: the digest participants sign for `identifier`
    async fn get_message_hash(
        &self,
        identifier: &MeetingIdentifier,
    ) -> Result<MessageHash, VerifierError>;

    /// Signature verifier: whether `signature` over the challenge for `identifier` was produced
    /// by an address authorized for it. Malformed signatures verify as `false`.
    async fn verify(
        &self,
        identifier: &MeetingIdentifier,
        signature: &[u8],
    ) -> Result<bool, VerifierError>;

    /// Owner only. Authorize every address in `signers` for `identifier`; already authorized
    /// addresses are left as they are.
    async fn map_identifier_to_signers(
        &self,
        identifier: &MeetingIdentifier,
        signers: &[Address],
    ) -> Result<(), VerifierError>;

    async fn map_identifier_to_signer(
        &self,
        identifier: &MeetingIdentifier,
        signer: Address,
    ) -> Result<(), VerifierError> {
        self.map_identifier_to_signers(identifier, &[signer]).await
    }
}

#[async_trait]
impl<T> MeetingContract for Arc<T>
where
    T: MeetingContract + ?Sized,
{
    async fn get_message_hash(
        &self,
        identifier: &MeetingIdentifier,
    ) -> Result<MessageHash, VerifierError> {
        (**self).get_message_hash(identifier).await
    }

    async fn verify(
        &self,
        identifier: &MeetingIdentifier,
        signature: &[u8],
    ) -> Result<bool, VerifierError> {
        (**self).verify(identifier, signature).await
    }

    async fn map_identifier_to_signers(
        &self,
        identifier: &MeetingIdentifier,
        signers: &[Address],
    ) -> Result<(), VerifierError> {
        (**self).map_identifier_to_signers(identifier, signers).await
    }
}

#[async_trait]
impl<T> MeetingContract for Box<T>
where
    T: MeetingContract + ?Sized,
{
    async fn get_message_hash(
        &self,
        identifier: &MeetingIdentifier,
    ) -> Result<MessageHash, VerifierError> {
        (**self).get_message_hash(identifier).await
    }

    async fn verify(
        &self,
        identifier: &MeetingIdentifier,
        signature: &[u8],
    ) -> Result<bool, VerifierError> {
        (**self).verify(identifier, signature).await
    }

    async fn map_identifier_to_signers(
        &self,
        identifier: &MeetingIdentifier,
        signers: &[Address],
    ) -> Result<(), VerifierError> {
        (**self).map_identifier_to_signers(identifier, signers).await
    }
}
