use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};
use vmeet_configuration::MEETING_ID_MAX_ATTEMPTS;
use vmeet_cryptography::signature::{
    h160addr_to_string, parse_address, sanitize_evm_addresses, IdentifierValidationError,
};
use vmeet_id::{Address, MeetingContract, MeetingIdentifier, VerifierError};

use crate::models::{Meeting, User};
use crate::store::{DirectoryError, MeetingDirectory};

#[derive(Debug, Error)]
pub enum MeetingServiceError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Contract(#[from] VerifierError),
    #[error(transparent)]
    Address(#[from] IdentifierValidationError),
    #[error("please select at least one user")]
    NoParticipantsSelected,
    #[error("only the meeting creator can {action}")]
    NotCreator { action: &'static str },
    #[error("no free meeting id after {0} attempts")]
    IdSpaceExhausted(usize),
}

/// Outcome of connecting a wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connection {
    Connected(User),
    /// The address has no username yet
    NeedsRegistration(Address),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSummary {
    pub address: Address,
    pub display_name: String,
    pub is_creator: bool,
}

/// A meeting as shown to one of its participants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingSummary {
    pub id: MeetingIdentifier,
    pub created_by: Address,
    pub created_at: DateTime<Utc>,
    /// Whether the viewer created this meeting
    pub is_creator: bool,
    pub participants: Vec<ParticipantSummary>,
}

/// Meeting management on top of a [`MeetingDirectory`].
///
/// Every participant stored for a meeting is also registered as an authorized signer on the
/// contract, so `contract` must be connected with the owner key. The directory is written
/// first; a failed registration can be completed by inviting the same addresses again.
pub struct MeetingService<D, C> {
    directory: D,
    contract: C,
}

impl<D, C> MeetingService<D, C>
where
    D: MeetingDirectory,
    C: MeetingContract,
{
    pub fn new(directory: D, contract: C) -> Self {
        Self {
            directory,
            contract,
        }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn contract(&self) -> &C {
        &self.contract
    }

    pub async fn connect(&self, address: Address) -> Result<Connection, MeetingServiceError> {
        let connection = match self.directory.find_user(address).await? {
            Some(user) => Connection::Connected(user),
            None => Connection::NeedsRegistration(address),
        };
        debug!(address = %h160addr_to_string(address), ?connection, "wallet connected");
        Ok(connection)
    }

    pub async fn register(
        &self,
        address: Address,
        username: &str,
    ) -> Result<User, MeetingServiceError> {
        Ok(self.directory.register_user(address, username).await?)
    }

    /// Create a meeting under a fresh identifier with `creator` as its first participant
    pub async fn create_meeting(&self, creator: Address) -> Result<Meeting, MeetingServiceError> {
        let meeting = self.insert_fresh_meeting(creator).await?;
        self.directory
            .add_participants(&meeting.id, &[creator])
            .await?;
        self.contract
            .map_identifier_to_signer(&meeting.id, creator)
            .await?;

        info!(
            meeting = %meeting.id,
            creator = %h160addr_to_string(creator),
            "created meeting"
        );
        Ok(meeting)
    }

    async fn insert_fresh_meeting(&self, creator: Address) -> Result<Meeting, MeetingServiceError> {
        for _ in 0..MEETING_ID_MAX_ATTEMPTS {
            let meeting = Meeting::new(MeetingIdentifier::generate(), creator);
            match self.directory.insert_meeting(&meeting).await {
                Ok(()) => return Ok(meeting),
                Err(DirectoryError::MeetingExists(id)) => {
                    debug!(meeting = %id, "meeting id taken, generating another");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(MeetingServiceError::IdSpaceExhausted(
            MEETING_ID_MAX_ATTEMPTS,
        ))
    }

    /// Add `addresses` to the meeting and authorize them on the contract.
    ///
    /// Returns the addresses that were not participants before.
    pub async fn invite(
        &self,
        meeting_id: &MeetingIdentifier,
        inviter: Address,
        addresses: &[impl AsRef<str>],
    ) -> Result<Vec<Address>, MeetingServiceError> {
        if addresses.is_empty() {
            return Err(MeetingServiceError::NoParticipantsSelected);
        }
        let meeting = self.require_meeting(meeting_id).await?;
        if !meeting.is_creator(&inviter) {
            return Err(MeetingServiceError::NotCreator {
                action: "add participants",
            });
        }

        let mut selected = Vec::with_capacity(addresses.len());
        for address in sanitize_evm_addresses(addresses)? {
            let address = parse_address(address)?;
            if !selected.contains(&address) {
                selected.push(address);
            }
        }

        let added = self
            .directory
            .add_participants(meeting_id, &selected)
            .await?;
        // idempotent on the contract
        self.contract
            .map_identifier_to_signers(meeting_id, &selected)
            .await?;

        info!(
            meeting = %meeting_id,
            added = added.len(),
            already_present = selected.len() - added.len(),
            "invited participants"
        );
        Ok(added)
    }

    /// Delete the meeting from the directory.
    ///
    /// Signer registrations stay on the contract; there is no way to revoke them.
    pub async fn delete_meeting(
        &self,
        meeting_id: &MeetingIdentifier,
        requester: Address,
    ) -> Result<(), MeetingServiceError> {
        let meeting = self.require_meeting(meeting_id).await?;
        if !meeting.is_creator(&requester) {
            return Err(MeetingServiceError::NotCreator {
                action: "delete the meeting",
            });
        }
        self.directory.delete_meeting(meeting_id).await?;
        Ok(())
    }

    pub async fn meetings_for(
        &self,
        viewer: Address,
    ) -> Result<Vec<MeetingSummary>, MeetingServiceError> {
        let meetings = self.directory.meetings_for(viewer).await?;
        let mut summaries = Vec::with_capacity(meetings.len());

        for entry in meetings {
            let mut participants = Vec::with_capacity(entry.participants.len());
            for address in entry.participants {
                participants.push(ParticipantSummary {
                    address,
                    display_name: self.directory.display_name(address).await?,
                    is_creator: entry.meeting.is_creator(&address),
                });
            }
            summaries.push(MeetingSummary {
                is_creator: entry.meeting.is_creator(&viewer),
                id: entry.meeting.id,
                created_by: entry.meeting.created_by,
                created_at: entry.meeting.created_at,
                participants,
            });
        }
        Ok(summaries)
    }

    async fn require_meeting(
        &self,
        meeting_id: &MeetingIdentifier,
    ) -> Result<Meeting, MeetingServiceError> {
        self.directory
            .find_meeting(meeting_id)
            .await?
            .ok_or_else(|| DirectoryError::MeetingNotFound(meeting_id.clone()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryDirectory, MockDirectory};
    use ethers::signers::Signer;
    use vmeet_configuration::UNKNOWN_USER_NAME;
    use vmeet_id::test_utils::{anvil_wallet, MockContract};
    use vmeet_id::{JoinError, JoinFlow, LocalVerifyContract};

    fn service() -> MeetingService<InMemoryDirectory, LocalVerifyContract> {
        MeetingService::new(
            InMemoryDirectory::new(),
            LocalVerifyContract::deploy(anvil_wallet(0).address()),
        )
    }

    fn addr(i: usize) -> Address {
        anvil_wallet(i).address()
    }

    fn hex(i: usize) -> String {
        h160addr_to_string(addr(i))
    }

    #[tokio::test]
    async fn connect_then_register() {
        let service = service();
        assert_eq!(
            service.connect(addr(1)).await.unwrap(),
            Connection::NeedsRegistration(addr(1))
        );

        let user = service.register(addr(1), "alice").await.unwrap();
        assert_eq!(
            service.connect(addr(1)).await.unwrap(),
            Connection::Connected(user)
        );
    }

    #[tokio::test]
    async fn creator_can_join_new_meeting() {
        let service = service();
        let meeting = service.create_meeting(addr(1)).await.unwrap();
        assert!(meeting.id.is_segmented());
        assert_eq!(
            service.directory().participants(&meeting.id).await.unwrap(),
            vec![addr(1)]
        );

        let mut flow = JoinFlow::new(anvil_wallet(1), service.contract().clone());
        flow.join(meeting.id.as_str()).await.unwrap();
    }

    #[tokio::test]
    async fn invited_participant_can_join() {
        let service = service();
        let meeting = service.create_meeting(addr(1)).await.unwrap();

        let mut outsider = JoinFlow::new(anvil_wallet(2), service.contract().clone());
        assert!(matches!(
            outsider.join(meeting.id.as_str()).await,
            Err(JoinError::VerificationFailed)
        ));

        let added = service
            .invite(&meeting.id, addr(1), &[hex(2).to_uppercase().replace("0X", "0x")])
            .await
            .unwrap();
        assert_eq!(added, vec![addr(2)]);
        outsider.join(meeting.id.as_str()).await.unwrap();
    }

    #[tokio::test]
    async fn invite_skips_existing_participants() {
        let service = service();
        let meeting = service.create_meeting(addr(1)).await.unwrap();

        let added = service
            .invite(&meeting.id, addr(1), &[hex(1), hex(2), hex(2)])
            .await
            .unwrap();
        assert_eq!(added, vec![addr(2)]);
        assert!(service
            .invite(&meeting.id, addr(1), &[hex(2)])
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            service.directory().participants(&meeting.id).await.unwrap(),
            vec![addr(1), addr(2)]
        );
    }

    #[tokio::test]
    async fn only_creator_invites() {
        let service = service();
        let meeting = service.create_meeting(addr(1)).await.unwrap();

        let err = service
            .invite(&meeting.id, addr(2), &[hex(3)])
            .await
            .unwrap_err();
        assert!(matches!(err, MeetingServiceError::NotCreator { .. }));
        assert!(!service.contract().is_authorized(&meeting.id, &addr(3)));
    }

    #[tokio::test]
    async fn invite_validates_selection() {
        let service = service();
        let meeting = service.create_meeting(addr(1)).await.unwrap();

        let none: [&str; 0] = [];
        assert!(matches!(
            service.invite(&meeting.id, addr(1), &none).await,
            Err(MeetingServiceError::NoParticipantsSelected)
        ));
        assert!(matches!(
            service.invite(&meeting.id, addr(1), &["0xnot-an-address"]).await,
            Err(MeetingServiceError::Address(
                IdentifierValidationError::InvalidAddresses(_)
            ))
        ));

        let missing = MeetingIdentifier::new("NOPE-NOPE-NOPE").unwrap();
        assert!(matches!(
            service.invite(&missing, addr(1), &[hex(2)]).await,
            Err(MeetingServiceError::Directory(DirectoryError::MeetingNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn delete_is_creator_only_and_keeps_registrations() {
        let service = service();
        let meeting = service.create_meeting(addr(1)).await.unwrap();
        service
            .invite(&meeting.id, addr(1), &[hex(2)])
            .await
            .unwrap();

        assert!(matches!(
            service.delete_meeting(&meeting.id, addr(2)).await,
            Err(MeetingServiceError::NotCreator { .. })
        ));
        service.delete_meeting(&meeting.id, addr(1)).await.unwrap();
        assert!(service.meetings_for(addr(2)).await.unwrap().is_empty());

        // the contract registry is append-only
        let mut flow = JoinFlow::new(anvil_wallet(2), service.contract().clone());
        flow.join(meeting.id.as_str()).await.unwrap();
    }

    #[tokio::test]
    async fn summaries_name_participants() {
        let service = service();
        service.register(addr(1), "alice").await.unwrap();
        let meeting = service.create_meeting(addr(1)).await.unwrap();
        service
            .invite(&meeting.id, addr(1), &[hex(2)])
            .await
            .unwrap();

        let summaries = service.meetings_for(addr(2)).await.unwrap();
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.id, meeting.id);
        assert!(!summary.is_creator);
        assert_eq!(
            summary.participants,
            vec![
                ParticipantSummary {
                    address: addr(1),
                    display_name: "alice".into(),
                    is_creator: true,
                },
                ParticipantSummary {
                    address: addr(2),
                    display_name: UNKNOWN_USER_NAME.into(),
                    is_creator: false,
                },
            ]
        );
        assert!(service.meetings_for(addr(1)).await.unwrap()[0].is_creator);
    }

    #[tokio::test]
    async fn create_retries_taken_ids() {
        let mut directory = MockDirectory::new();
        let mut taken = true;
        directory
            .expect_insert_meeting()
            .times(2)
            .returning(move |meeting| {
                if std::mem::replace(&mut taken, false) {
                    Err(DirectoryError::MeetingExists(meeting.id.clone()))
                } else {
                    Ok(())
                }
            });
        directory
            .expect_add_participants()
            .times(1)
            .returning(|_, addresses| Ok(addresses.to_vec()));

        let mut contract = MockContract::new();
        contract
            .expect_map_identifier_to_signer()
            .times(1)
            .returning(|_, _| Ok(()));

        let service = MeetingService::new(directory, contract);
        service.create_meeting(addr(1)).await.unwrap();
    }

    #[tokio::test]
    async fn create_gives_up_after_repeated_collisions() {
        let mut directory = MockDirectory::new();
        directory
            .expect_insert_meeting()
            .times(MEETING_ID_MAX_ATTEMPTS)
            .returning(|meeting| Err(DirectoryError::MeetingExists(meeting.id.clone())));
        directory.expect_add_participants().never();
        let mut contract = MockContract::new();
        contract.expect_map_identifier_to_signer().never();

        let service = MeetingService::new(directory, contract);
        assert!(matches!(
            service.create_meeting(addr(1)).await,
            Err(MeetingServiceError::IdSpaceExhausted(_))
        ));
    }

    #[tokio::test]
    async fn non_owner_contract_surfaces_on_invite() {
        let directory = InMemoryDirectory::new();
        let deployment = LocalVerifyContract::deploy(addr(0));
        let owner_service = MeetingService::new(directory.clone(), deployment.clone());
        let meeting = owner_service.create_meeting(addr(1)).await.unwrap();

        let stranger_service = MeetingService::new(directory, deployment.connect(addr(5)));
        let err = stranger_service
            .invite(&meeting.id, addr(1), &[hex(2)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MeetingServiceError::Contract(VerifierError::NotOwner { .. })
        ));

        // stored, but only authorized once the owner registers them
        owner_service
            .invite(&meeting.id, addr(1), &[hex(2)])
            .await
            .unwrap();
        assert!(deployment.is_authorized(&meeting.id, &addr(2)));
    }
}
