//! Alias for the index-preserving map used throughout the crate,
//! configured with a specific hasher.

/// [`indexmap::IndexMap`] configured with a specific hasher.
///
/// Array values enumerate their entries in insertion order, which keeps
/// serialization and validation deterministic within a process without
/// promising any particular key order externally.
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, ahash::RandomState>;
