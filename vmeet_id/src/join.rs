//! Client side of the join-authorization protocol.
//!
//! ```text
//! Idle -> ChallengeRequested -> Signed -> Verifying -> Joined
//!   ^___________________________________________/ (any failure)
//! ```
use thiserror::Error;
use tracing::{debug, info, warn};
use vmeet_common::fmt::TruncatedHex;
use vmeet_cryptography::signature::h160addr_to_string;

use crate::contract::{MeetingContract, VerifierError};
use crate::meeting_id::{MeetingIdError, MeetingIdentifier};
use crate::wallet::{WalletProvider, WalletProviderError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinState {
    Idle,
    ChallengeRequested,
    Signed,
    Verifying,
    Joined(MeetingIdentifier),
}

#[derive(Debug, Error)]
pub enum JoinError {
    #[error("signature request was cancelled in the wallet")]
    UserCancelled,
    #[error("could not reach the network or wallet: {0}")]
    TransportFault(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("this wallet is not authorized to join the meeting")]
    VerificationFailed,
    #[error("invalid meeting id: {0}")]
    MalformedInput(#[from] MeetingIdError),
}

impl From<VerifierError> for JoinError {
    fn from(err: VerifierError) -> Self {
        JoinError::TransportFault(Box::new(err))
    }
}

impl From<WalletProviderError> for JoinError {
    fn from(err: WalletProviderError) -> Self {
        match err {
            WalletProviderError::Rejected => JoinError::UserCancelled,
            unavailable => JoinError::TransportFault(Box::new(unavailable)),
        }
    }
}

/// Drives one user session through the join protocol.
///
/// Each step is a sequential round trip and nothing is retried; after a failure the flow is
/// back in [`JoinState::Idle`] and the user starts again by calling [`JoinFlow::join`].
pub struct JoinFlow<W, C> {
    wallet: W,
    contract: C,
    state: JoinState,
}

impl<W, C> JoinFlow<W, C>
where
    W: WalletProvider,
    C: MeetingContract,
{
    pub fn new(wallet: W, contract: C) -> Self {
        Self {
            wallet,
            contract,
            state: JoinState::Idle,
        }
    }

    pub fn state(&self) -> &JoinState {
        &self.state
    }

    pub fn joined_meeting(&self) -> Option<&MeetingIdentifier> {
        match &self.state {
            JoinState::Joined(identifier) => Some(identifier),
            _ => None,
        }
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn contract(&self) -> &C {
        &self.contract
    }

    /// Leave the current meeting, ready to join another
    pub fn leave(&mut self) {
        if let Some(identifier) = self.joined_meeting() {
            info!(meeting = %identifier, "left meeting");
        }
        self.state = JoinState::Idle;
    }

    /// Prove membership of `identifier` and enter the meeting.
    pub async fn join(&mut self, identifier: &str) -> Result<MeetingIdentifier, JoinError> {
        self.transition(JoinState::Idle);

        match self.authorize(identifier).await {
            Ok(identifier) => {
                info!(meeting = %identifier, "joined meeting");
                self.transition(JoinState::Joined(identifier.clone()));
                Ok(identifier)
            }
            Err(err) => {
                warn!(meeting = identifier, "join failed: {err}");
                self.transition(JoinState::Idle);
                Err(err)
            }
        }
    }

    async fn authorize(&mut self, identifier: &str) -> Result<MeetingIdentifier, JoinError> {
        // rejected before anything leaves the client
        let identifier = MeetingIdentifier::new(identifier)?;

        self.transition(JoinState::ChallengeRequested);
        let hash = self.contract.get_message_hash(&identifier).await?;
        debug!(meeting = %identifier, %hash, "received challenge");

        let account = self.wallet.request_accounts().await?;
        let signature = self.wallet.personal_sign(account, &hash).await?;
        debug!(
            account = %h160addr_to_string(account),
            signature = %signature.bytes().short_hex(),
            "challenge signed"
        );
        self.transition(JoinState::Signed);

        self.transition(JoinState::Verifying);
        if self.contract.verify(&identifier, signature.bytes()).await? {
            Ok(identifier)
        } else {
            Err(JoinError::VerificationFailed)
        }
    }

    fn transition(&mut self, next: JoinState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "join state");
        }
        self.state = next;
    }
}
