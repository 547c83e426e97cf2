//! Meeting identifier format

/// Characters a generated meeting identifier segment is drawn from
pub const MEETING_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const MEETING_ID_SEGMENTS: usize = 3;

pub const MEETING_ID_SEGMENT_LEN: usize = 4;

pub const MEETING_ID_SEPARATOR: char = '-';

/// Shown for participants that never registered a username
pub const UNKNOWN_USER_NAME: &str = "Unknown User";

/// Fresh identifiers tried before giving up on a collision
pub const MEETING_ID_MAX_ATTEMPTS: usize = 5;
