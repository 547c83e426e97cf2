use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;
use vmeet_configuration::UNKNOWN_USER_NAME;
use vmeet_cryptography::signature::h160addr_to_string;
use vmeet_id::{Address, MeetingIdentifier};

use crate::models::{Meeting, MeetingWithParticipants, User};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("a username is required")]
    UsernameRequired,
    #[error("{0} is already registered")]
    UserExists(String),
    #[error("meeting {0} already exists")]
    MeetingExists(MeetingIdentifier),
    #[error("meeting {0} not found")]
    MeetingNotFound(MeetingIdentifier),
}

/// Storage for users, meetings and meeting participants.
///
/// Addresses are compared as 20 byte values, so lookups never depend on the letter case the
/// address was typed in.
#[async_trait]
pub trait MeetingDirectory: Send + Sync {
    async fn find_user(&self, address: Address) -> Result<Option<User>, DirectoryError>;

    /// Register `username` for `address`. Surrounding whitespace is dropped.
    async fn register_user(&self, address: Address, username: &str)
        -> Result<User, DirectoryError>;

    /// Every registered user, ordered by username
    async fn list_users(&self) -> Result<Vec<User>, DirectoryError>;

    /// Case-insensitive substring match on username or address
    async fn search_users(&self, query: &str) -> Result<Vec<User>, DirectoryError> {
        let query = query.trim().to_lowercase();
        let users = self.list_users().await?;
        if query.is_empty() {
            return Ok(users);
        }

        Ok(users
            .into_iter()
            .filter(|user| {
                user.username.to_lowercase().contains(&query)
                    || h160addr_to_string(user.address).contains(&query)
            })
            .collect())
    }

    async fn insert_meeting(&self, meeting: &Meeting) -> Result<(), DirectoryError>;

    async fn find_meeting(&self, id: &MeetingIdentifier)
        -> Result<Option<Meeting>, DirectoryError>;

    /// Add `addresses` to the meeting, returning the ones that were not participants yet
    async fn add_participants(
        &self,
        id: &MeetingIdentifier,
        addresses: &[Address],
    ) -> Result<Vec<Address>, DirectoryError>;

    async fn participants(&self, id: &MeetingIdentifier) -> Result<Vec<Address>, DirectoryError>;

    /// Meetings `address` takes part in, newest first
    async fn meetings_for(
        &self,
        address: Address,
    ) -> Result<Vec<MeetingWithParticipants>, DirectoryError>;

    /// Remove the meeting and its participant list
    async fn delete_meeting(&self, id: &MeetingIdentifier) -> Result<(), DirectoryError>;

    async fn display_name(&self, address: Address) -> Result<String, DirectoryError> {
        Ok(self
            .find_user(address)
            .await?
            .map(|user| user.username)
            .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string()))
    }
}

#[cfg(any(test, feature = "test-utils"))]
mockall::mock! {
    pub Directory {}

    #[async_trait]
    impl MeetingDirectory for Directory {
        async fn find_user(&self, address: Address) -> Result<Option<User>, DirectoryError>;
        async fn register_user(
            &self,
            address: Address,
            username: &str,
        ) -> Result<User, DirectoryError>;
        async fn list_users(&self) -> Result<Vec<User>, DirectoryError>;
        async fn search_users(&self, query: &str) -> Result<Vec<User>, DirectoryError>;
        async fn insert_meeting(&self, meeting: &Meeting) -> Result<(), DirectoryError>;
        async fn find_meeting(
            &self,
            id: &MeetingIdentifier,
        ) -> Result<Option<Meeting>, DirectoryError>;
        async fn add_participants(
            &self,
            id: &MeetingIdentifier,
            addresses: &[Address],
        ) -> Result<Vec<Address>, DirectoryError>;
        async fn participants(
            &self,
            id: &MeetingIdentifier,
        ) -> Result<Vec<Address>, DirectoryError>;
        async fn meetings_for(
            &self,
            address: Address,
        ) -> Result<Vec<MeetingWithParticipants>, DirectoryError>;
        async fn delete_meeting(&self, id: &MeetingIdentifier) -> Result<(), DirectoryError>;
        async fn display_name(&self, address: Address) -> Result<String, DirectoryError>;
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Address, User>,
    meetings: HashMap<MeetingIdentifier, Meeting>,
    participants: HashMap<MeetingIdentifier, Vec<Address>>,
}

/// [`MeetingDirectory`] kept in process memory. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MeetingDirectory for InMemoryDirectory {
    async fn find_user(&self, address: Address) -> Result<Option<User>, DirectoryError> {
        Ok(self.tables.read().users.get(&address).cloned())
    }

    async fn register_user(
        &self,
        address: Address,
        username: &str,
    ) -> Result<User, DirectoryError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DirectoryError::UsernameRequired);
        }

        let mut tables = self.tables.write();
        if tables.users.contains_key(&address) {
            return Err(DirectoryError::UserExists(h160addr_to_string(address)));
        }
        let user = User {
            address,
            username: username.to_string(),
        };
        tables.users.insert(address, user.clone());
        tracing::info!(address = %h160addr_to_string(address), username, "registered user");
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, DirectoryError> {
        let mut users = self
            .tables
            .read()
            .users
            .values()
            .cloned()
            .collect::<Vec<_>>();
        users.sort_by(|a, b| {
            a.username
                .cmp(&b.username)
                .then_with(|| a.address.cmp(&b.address))
        });
        Ok(users)
    }

    async fn insert_meeting(&self, meeting: &Meeting) -> Result<(), DirectoryError> {
        let mut tables = self.tables.write();
        if tables.meetings.contains_key(&meeting.id) {
            return Err(DirectoryError::MeetingExists(meeting.id.clone()));
        }
        tables.meetings.insert(meeting.id.clone(), meeting.clone());
        tables.participants.insert(meeting.id.clone(), Vec::new());
        Ok(())
    }

    async fn find_meeting(
        &self,
        id: &MeetingIdentifier,
    ) -> Result<Option<Meeting>, DirectoryError> {
        Ok(self.tables.read().meetings.get(id).cloned())
    }

    async fn add_participants(
        &self,
        id: &MeetingIdentifier,
        addresses: &[Address],
    ) -> Result<Vec<Address>, DirectoryError> {
        let mut tables = self.tables.write();
        let participants = tables
            .participants
            .get_mut(id)
            .ok_or_else(|| DirectoryError::MeetingNotFound(id.clone()))?;

        let mut added = Vec::new();
        for address in addresses {
            if !participants.contains(address) {
                participants.push(*address);
                added.push(*address);
            }
        }
        Ok(added)
    }

    async fn participants(&self, id: &MeetingIdentifier) -> Result<Vec<Address>, DirectoryError> {
        self.tables
            .read()
            .participants
            .get(id)
            .cloned()
            .ok_or_else(|| DirectoryError::MeetingNotFound(id.clone()))
    }

    async fn meetings_for(
        &self,
        address: Address,
    ) -> Result<Vec<MeetingWithParticipants>, DirectoryError> {
        let tables = self.tables.read();
        let mut meetings = tables
            .participants
            .iter()
            .filter(|(_, participants)| participants.contains(&address))
            .filter_map(|(id, participants)| {
                tables.meetings.get(id).map(|meeting| MeetingWithParticipants {
                    meeting: meeting.clone(),
                    participants: participants.clone(),
                })
            })
            .collect::<Vec<_>>();
        meetings.sort_by(|a, b| {
            b.meeting
                .created_at
                .cmp(&a.meeting.created_at)
                .then_with(|| a.meeting.id.cmp(&b.meeting.id))
        });
        Ok(meetings)
    }

    async fn delete_meeting(&self, id: &MeetingIdentifier) -> Result<(), DirectoryError> {
        let mut tables = self.tables.write();
        if tables.meetings.remove(id).is_none() {
            return Err(DirectoryError::MeetingNotFound(id.clone()));
        }
        tables.participants.remove(id);
        tracing::info!(meeting = %id, "deleted meeting");
        Ok(())
    }
}
