//! Identifier generation for persisted records.
//!
//! Two independent identifier domains:
//! - asset rows get a time-ordered 64-bit id from [`AssetIdGenerator`]
//! - item rows get a 9-byte [`PackedItemId`] embedding the stable `game_id`
//!
//! Asset ids sort by creation time; packed item ids deliberately do not.

use rand::Rng;
use std::fmt::{self, Write as _};
use std::time::{SystemTime, UNIX_EPOCH};

/// Custom epoch for asset ids: 2020-01-01T00:00:00Z in unix milliseconds.
pub const EPOCH_OFFSET_MS: u64 = 1_577_836_800_000;

const TIMESTAMP_BITS: u32 = 41;
const WORKER_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;

const WORKER_MASK: u64 = (1 << WORKER_BITS) - 1;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

/// Process-unique, monotonically non-decreasing 64-bit id source.
///
/// Layout, most significant first: 41 bits of milliseconds since
/// [`EPOCH_OFFSET_MS`], a 10-bit worker discriminant, and a 12-bit
/// per-millisecond sequence. A single generator instance must own an id
/// domain for the lifetime of the process.
#[derive(Debug)]
pub struct AssetIdGenerator {
    worker_id: u64,
    last_ms: u64,
    sequence: u64,
}

impl AssetIdGenerator {
    /// Create a generator for the given worker discriminant.
    ///
    /// Only the low 10 bits of `worker_id` are used.
    #[must_use]
    pub fn new(worker_id: u16) -> Self {
        Self {
            worker_id: u64::from(worker_id) & WORKER_MASK,
            last_ms: 0,
            sequence: 0,
        }
    }

    /// Produce the next id.
    ///
    /// Ids from one generator never repeat and never decrease. A clock that
    /// steps backwards is clamped to the last observed millisecond; the
    /// sequence field absorbs bursts within one millisecond.
    pub fn next_id(&mut self) -> u64 {
        let now = Self::clock_ms().max(self.last_ms);

        if now == self.last_ms {
            self.sequence = (self.sequence + 1) & SEQUENCE_MASK;
            if self.sequence == 0 {
                // Sequence exhausted within this millisecond; move to the next.
                self.last_ms += 1;
            }
        } else {
            self.last_ms = now;
            self.sequence = 0;
        }

        (self.last_ms << (WORKER_BITS + SEQUENCE_BITS))
            | (self.worker_id << SEQUENCE_BITS)
            | self.sequence
    }

    fn clock_ms() -> u64 {
        let unix_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(0));
        let since_epoch = unix_ms.saturating_sub(EPOCH_OFFSET_MS);
        since_epoch & ((1 << TIMESTAMP_BITS) - 1)
    }
}

/// Byte width of a packed item id.
pub const PACKED_ID_LEN: usize = 9;

/// Offset of the big-endian `game_id` inside a packed item id.
const GAME_ID_OFFSET: usize = 2;

/// 72-bit item row identifier, transmitted as 18 hex characters.
///
/// Byte layout: `[2 random][4 big-endian game_id][1 random][2 random]`.
/// The `game_id` sits at a fixed offset so any consumer that knows the
/// layout can recover it; the random padding exists to defeat naive
/// sequential-id guessing by external observers.
///
/// A fresh id is generated on *every* row write, including in-place field
/// updates. Only the embedded `game_id` is stable across regenerations;
/// nothing external may pin the surrogate id itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedItemId([u8; PACKED_ID_LEN]);

impl PackedItemId {
    /// Generate a fresh id embedding `game_id`, drawing padding from `rng`.
    pub fn generate<R: Rng + ?Sized>(game_id: i32, rng: &mut R) -> Self {
        let mut bytes = [0u8; PACKED_ID_LEN];
        rng.fill_bytes(&mut bytes);
        bytes[GAME_ID_OFFSET..GAME_ID_OFFSET + 4].copy_from_slice(&game_id.to_be_bytes());
        Self(bytes)
    }

    /// Generate a fresh id using the thread-local random source.
    #[must_use]
    pub fn generate_default(game_id: i32) -> Self {
        Self::generate(game_id, &mut rand::thread_rng())
    }

    /// Recover the embedded stable item key.
    #[must_use]
    pub fn game_id(&self) -> i32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.0[GAME_ID_OFFSET..GAME_ID_OFFSET + 4]);
        i32::from_be_bytes(raw)
    }

    /// Hex form as stored in the `items.id` column (18 lowercase chars).
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(PACKED_ID_LEN * 2);
        for byte in self.0 {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    /// Parse the stored hex form back into an id.
    ///
    /// Returns `None` when `hex` is not exactly 18 hex characters.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != PACKED_ID_LEN * 2 {
            return None;
        }
        let mut bytes = [0u8; PACKED_ID_LEN];
        for (i, chunk) in hex.as_bytes().chunks_exact(2).enumerate() {
            let pair = std::str::from_utf8(chunk).ok()?;
            bytes[i] = u8::from_str_radix(pair, 16).ok()?;
        }
        Some(Self(bytes))
    }
}

impl fmt::Display for PackedItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
