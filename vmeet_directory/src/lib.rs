//! Users, meetings and participants, and the service that keeps them in step with the
//! on-chain signer registry.
pub mod models;
pub mod service;
pub mod store;

pub use models::{Meeting, MeetingWithParticipants, User};
pub use service::{
    Connection, MeetingService, MeetingServiceError, MeetingSummary, ParticipantSummary,
};
pub use store::{DirectoryError, InMemoryDirectory, MeetingDirectory};

#[cfg(any(test, feature = "test-utils"))]
pub use store::MockDirectory;
