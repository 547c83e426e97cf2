use chrono::{DateTime, Utc};
use vmeet_id::{Address, MeetingIdentifier};

/// A wallet address that registered a username
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub address: Address,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meeting {
    pub id: MeetingIdentifier,
    pub created_by: Address,
    pub created_at: DateTime<Utc>,
}

impl Meeting {
    pub fn new(id: MeetingIdentifier, created_by: Address) -> Self {
        Self {
            id,
            created_by,
            created_at: Utc::now(),
        }
    }

    pub fn is_creator(&self, address: &Address) -> bool {
        &self.created_by == address
    }
}

/// A meeting together with every participant address, in the order they were added
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingWithParticipants {
    pub meeting: Meeting,
    pub participants: Vec<Address>,
}
