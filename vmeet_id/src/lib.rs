//! Meeting identity: identifiers, the signing challenge, the on-chain signer registry and the
//! client side join protocol built on top of them.
pub mod challenge;
pub mod contract;
pub mod join;
pub mod meeting_id;
pub mod wallet;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use challenge::MessageHash;
pub use contract::{LocalVerifyContract, MeetingContract, RpcVerifyContract, VerifierError};
pub use join::{JoinError, JoinFlow, JoinState};
pub use meeting_id::{MeetingIdError, MeetingIdentifier};
pub use wallet::{WalletProvider, WalletProviderError};

/// Re-exported so callers do not need a direct ethers dependency for addresses
pub use ethers::types::Address;
