//! Store-assigned record identifiers.
//!
//! Ids use the document-database object-id layout: a 4-byte big-endian
//! seconds timestamp, 5 bytes unique to this process, and a 3-byte counter.
//! They render as 24 lowercase hex characters. Within one process the counter
//! keeps ids unique; they sort by creation second.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Number of raw bytes in an id.
const ID_LEN: usize = 12;

/// Number of hex characters in the textual form.
const HEX_LEN: usize = ID_LEN * 2;

/// The counter occupies the low three bytes.
const COUNTER_MASK: u32 = 0x00FF_FFFF;

/// Identifier assigned to a record by the store on creation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId([u8; ID_LEN]);

impl RecordId {
    /// Mint a fresh id.
    #[must_use]
    pub fn generate() -> Self {
        let secs = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);
        let count = next_count();

        let mut bytes = [0u8; ID_LEN];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(process_bytes());
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Build an id from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes of the id.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// The second at which the id was minted.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        Utc.timestamp_opt(i64::from(secs), 0)
            .single()
            .unwrap_or_default()
    }

    /// Parse the textual form, failing with [`Error::MalformedId`].
    ///
    /// # Errors
    ///
    /// Returns an error unless `input` is exactly 24 hex digits.
    pub fn parse(input: &str) -> Result<Self> {
        input.parse()
    }
}

/// Five bytes derived once per process from the pid and start time.
fn process_bytes() -> &'static [u8] {
    static BYTES: OnceLock<[u8; 5]> = OnceLock::new();
    BYTES.get_or_init(|| {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let seed = format!("{}:{nanos}", std::process::id());
        let hash = blake3::hash(seed.as_bytes());
        let mut out = [0u8; 5];
        out.copy_from_slice(&hash.as_bytes()[..5]);
        out
    })
}

/// Next value of the 24-bit counter, seeded from the process bytes.
fn next_count() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| {
        let hash = blake3::hash(process_bytes());
        let seed = hash.as_bytes();
        AtomicU32::new(u32::from_be_bytes([0, seed[0], seed[1], seed[2]]))
    });
    counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.as_bytes();
        if raw.len() != HEX_LEN {
            return Err(Error::malformed_id(s));
        }

        let mut bytes = [0u8; ID_LEN];
        for (i, pair) in raw.chunks_exact(2).enumerate() {
            let (Some(hi), Some(lo)) = (hex_value(pair[0]), hex_value(pair[1])) else {
                return Err(Error::malformed_id(s));
            };
            bytes[i] = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({self})")
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
