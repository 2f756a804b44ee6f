//! Hasher selection for the maps returned by pool data sources.
//!
//! `std-hash` always wins. Otherwise `rustc-hash` or `ahash` is used when
//! exactly one of them is enabled, and the std `HashMap` is the fallback.

#[cfg(all(feature = "rustc-hash", not(feature = "ahash"), not(feature = "std-hash")))]
pub type FastMap<K, V> = rustc_hash::FxHashMap<K, V>;

#[cfg(all(feature = "ahash", not(feature = "rustc-hash"), not(feature = "std-hash")))]
pub type FastMap<K, V> = ahash::AHashMap<K, V>;

#[cfg(not(any(
    all(feature = "rustc-hash", not(feature = "ahash"), not(feature = "std-hash")),
    all(feature = "ahash", not(feature = "rustc-hash"), not(feature = "std-hash")),
)))]
pub type FastMap<K, V> = std::collections::HashMap<K, V>;
