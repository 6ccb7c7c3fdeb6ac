// Snapshot (save state) support
//
// A snapshot is the whole machine state serialized with serde_json, tagged with
// a version that identifies this build's state layout. Snapshots from any other
// build are rejected outright; there is no migration.
//
// Flat layout produced by `Snapshot::to_bytes`:
//
// ```text
// 0..4    version     u32 little-endian
// 4..12   timestamp   i64 little-endian, milliseconds since the Unix epoch (UTC)
// 12..    image       JSON machine state
// ```

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Bumped whenever a serialized state struct changes shape
pub const LAYOUT_REVISION: u32 = 2;

/// Version tag of snapshots written by this build
pub const SNAPSHOT_VERSION: u32 = snapshot_version(env!("CARGO_PKG_VERSION"), LAYOUT_REVISION);

const HEADER_LEN: usize = 12;

/// Errors that can occur during snapshot operations
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot version mismatch: expected {expected:#010x}, found {found:#010x}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("could not decode snapshot: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("could not encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("snapshot is truncated: {len} bytes")]
    Truncated { len: usize },

    #[error("snapshot state is inconsistent: {0}")]
    Invalid(String),
}

/// 32-bit FNV-1a over the crate version and layout revision
pub const fn snapshot_version(crate_version: &str, revision: u32) -> u32 {
    const OFFSET_BASIS: u32 = 0x811C_9DC5;
    const PRIME: u32 = 0x0100_0193;

    let mut hash = OFFSET_BASIS;
    let bytes = crate_version.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(PRIME);
        i += 1;
    }

    let revision = revision.to_le_bytes();
    let mut i = 0;
    while i < revision.len() {
        hash ^= revision[i] as u32;
        hash = hash.wrapping_mul(PRIME);
        i += 1;
    }
    hash
}

/// Saved machine state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Layout tag; must equal [`SNAPSHOT_VERSION`] to load
    pub version: u32,

    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Opaque serialized state
    pub image: Vec<u8>,
}

impl Snapshot {
    /// Serialize a state into a snapshot of this build
    pub(crate) fn capture<T: Serialize>(state: &T) -> Result<Self, SnapshotError> {
        let image = serde_json::to_vec(state).map_err(SnapshotError::Encode)?;
        Ok(Snapshot {
            version: SNAPSHOT_VERSION,
            timestamp: Utc::now(),
            image,
        })
    }

    /// Check the version and decode an image, without touching anything else
    pub(crate) fn restore<T: DeserializeOwned>(version: u32, image: &[u8]) -> Result<T, SnapshotError> {
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: version,
            });
        }
        serde_json::from_slice(image).map_err(SnapshotError::Decode)
    }

    /// Size of the image in bytes
    pub fn len(&self) -> usize {
        self.image.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    /// Flatten into a single byte blob
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.image.len());
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.timestamp.timestamp_millis().to_le_bytes());
        bytes.extend_from_slice(&self.image);
        bytes
    }

    /// Split a blob from [`Self::to_bytes`]
    ///
    /// The version is not checked here; loading does that.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        if bytes.len() < HEADER_LEN {
            return Err(SnapshotError::Truncated { len: bytes.len() });
        }

        let version = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let mut millis = [0u8; 8];
        millis.copy_from_slice(&bytes[4..HEADER_LEN]);
        let timestamp = Utc
            .timestamp_millis_opt(i64::from_le_bytes(millis))
            .single()
            .unwrap_or_default();

        Ok(Snapshot {
            version,
            timestamp,
            image: bytes[HEADER_LEN..].to_vec(),
        })
    }
}
