//! # Packing Configuration Constants
//!
//! Every limit used by the store, the schema compiler and the collections is
//! defined here. Constants that constrain each other are co-located and the
//! relationships are enforced at compile time.
//!
//! ## Dependency Graph
//!
//! ```text
//! BYTES_PER_WORD (4)
//!       │
//!       ├─> MAX_WORDS (2^28)
//!       │     MAX_WORDS * BYTES_PER_WORD must stay addressable by an i32 byte
//!       │     address, so the whole store can be wrapped with plain modulo.
//!       │
//!       └─> MAX_STORAGE_BYTES (2^30)
//!             Ceiling for slot_count * record bytes in the record manager.
//!             Equal to the largest buildable store, so an oversized table is
//!             rejected as a configuration error before the store is built.
//!
//! MIN_SLOTS (8)
//!       │
//!       └─> Smallest table a record manager (and therefore a deque) accepts.
//!
//! FRONT_SENTINEL / BACK_SENTINEL
//!       │
//!       └─> Must be distinct and never collide with a slot index, so the
//!           largest usable capacity is FRONT_SENTINEL.min(BACK_SENTINEL).
//! ```

// ============================================================================
// MEMORY STORE GEOMETRY
// ============================================================================

/// Size of one storage word in bytes.
pub const BYTES_PER_WORD: usize = 4;

/// Size of one storage word in bits.
pub const BITS_PER_WORD: usize = BYTES_PER_WORD * 8;

/// Smallest store that can be built.
pub const MIN_WORDS: usize = 1;

/// Largest store that can be built (1 GiB of simulated memory).
pub const MAX_WORDS: usize = 1 << 28;

const _: () = assert!(
    (MAX_WORDS * BYTES_PER_WORD) as u64 <= i32::MAX as u64 + 1,
    "MAX_WORDS must keep every byte address representable as an i32"
);

// ============================================================================
// RECORD MANAGER LIMITS
// ============================================================================

/// Minimum number of record slots a record manager will size a store for.
pub const MIN_SLOTS: usize = 8;

/// Hard ceiling on `record bytes * slot count`.
pub const MAX_STORAGE_BYTES: usize = MAX_WORDS * BYTES_PER_WORD;

const _: () = assert!(
    MAX_STORAGE_BYTES % BYTES_PER_WORD == 0,
    "MAX_STORAGE_BYTES must be a whole number of words"
);

const _: () = assert!(
    MAX_STORAGE_BYTES <= MAX_WORDS * BYTES_PER_WORD,
    "every table under MAX_STORAGE_BYTES must fit in a buildable store"
);

// ============================================================================
// FIELD LAYOUT
// ============================================================================

/// Width of the element-count header written ahead of every fixed string.
pub const LENGTH_HEADER_BITS: usize = 32;

/// Byte form of [`LENGTH_HEADER_BITS`].
pub const LENGTH_HEADER_BYTES: usize = LENGTH_HEADER_BITS / 8;

/// UUIDs are always stored as two 64-bit halves.
pub const UUID_BITS: usize = 128;

const _: () = assert!(LENGTH_HEADER_BITS % 8 == 0, "string header must be byte sized");

// ============================================================================
// ARENA DEQUE
// ============================================================================

/// Link value meaning "nothing before this slot".
pub const FRONT_SENTINEL: u32 = u32::MAX;

/// Link value meaning "nothing after this slot". Also terminates the free list.
pub const BACK_SENTINEL: u32 = u32::MAX - 1;

/// Largest capacity whose slot indices cannot collide with a sentinel.
pub const MAX_DEQUE_CAPACITY: usize = BACK_SENTINEL as usize;

const _: () = assert!(FRONT_SENTINEL != BACK_SENTINEL, "deque sentinels must differ");
