use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vmeet_configuration::{
    MEETING_ID_ALPHABET, MEETING_ID_SEGMENTS, MEETING_ID_SEGMENT_LEN, MEETING_ID_SEPARATOR,
};
use vmeet_cryptography::utils::rng;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeetingIdError {
    #[error("meeting identifier is empty")]
    Empty,
}

/// Opaque key naming a meeting.
///
/// The identifier is both the registry lookup key and the payload hashed into the signing
/// challenge, so it is never altered after construction. Surrounding whitespace is dropped on
/// construction; any other non-empty string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MeetingIdentifier(String);

impl MeetingIdentifier {
    pub fn new(identifier: impl AsRef<str>) -> Result<Self, MeetingIdError> {
        let identifier = identifier.as_ref().trim();
        if identifier.is_empty() {
            return Err(MeetingIdError::Empty);
        }
        Ok(Self(identifier.to_string()))
    }

    /// Generate a fresh `XXXX-XXXX-XXXX` identifier
    pub fn generate() -> Self {
        Self::generate_with(&mut rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let segments = (0..MEETING_ID_SEGMENTS)
            .map(|_| {
                (0..MEETING_ID_SEGMENT_LEN)
                    .map(|_| {
                        let idx = rng.gen_range(0..MEETING_ID_ALPHABET.len());
                        char::from(MEETING_ID_ALPHABET[idx])
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>();

        Self(segments.join(&MEETING_ID_SEPARATOR.to_string()))
    }

    /// Whether this identifier has the shape of a generated one
    pub fn is_segmented(&self) -> bool {
        let segments = self.0.split(MEETING_ID_SEPARATOR).collect::<Vec<_>>();
        segments.len() == MEETING_ID_SEGMENTS
            && segments.iter().all(|segment| {
                segment.len() == MEETING_ID_SEGMENT_LEN
                    && segment.bytes().all(|b| MEETING_ID_ALPHABET.contains(&b))
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MeetingIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MeetingIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for MeetingIdentifier {
    type Err = MeetingIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for MeetingIdentifier {
    type Error = MeetingIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for MeetingIdentifier {
    type Error = MeetingIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MeetingIdentifier> for String {
    fn from(value: MeetingIdentifier) -> Self {
        value.0
    }
}
