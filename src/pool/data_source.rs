use std::convert::Infallible;

use alloy_primitives::keccak256;
use async_trait::async_trait;

use crate::pool::whirlpool::{TickArray, Whirlpool};
use crate::{Address, FastMap};

/// Read access to decoded pool and tick array accounts.
///
/// Implementations own fetching, caching and address derivation. The
/// quoter calls `get_pool` once and `get_tick_arrays` once per quote.
#[async_trait]
pub trait PoolDataSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// The pool at `pool_address`, `None` when no such account exists.
    async fn get_pool(&self, pool_address: &Address) -> Result<Option<Whirlpool>, Self::Error>;

    /// The tick arrays found among `addresses`.
    ///
    /// Addresses without an account are left out of the map, they are not
    /// an error.
    async fn get_tick_arrays(
        &self,
        addresses: &[Address],
    ) -> Result<FastMap<Address, TickArray>, Self::Error>;

    /// Address of the tick array of `pool_address` starting at
    /// `start_tick_index`.
    fn tick_array_address(&self, pool_address: &Address, start_tick_index: i32) -> Address;
}

/// Caller-owned snapshot store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    pools: FastMap<Address, Whirlpool>,
    tick_arrays: FastMap<Address, TickArray>,
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_pool(&mut self, pool_address: Address, pool: Whirlpool) -> Option<Whirlpool> {
        self.pools.insert(pool_address, pool)
    }

    /// Stores `tick_array` under the address derived from its start index.
    pub fn insert_tick_array(&mut self, pool_address: &Address, tick_array: TickArray) -> Address {
        let address = derive_tick_array_address(pool_address, tick_array.start_tick_index);
        self.tick_arrays.insert(address, tick_array);
        address
    }

    pub fn remove_pool(&mut self, pool_address: &Address) -> Option<Whirlpool> {
        self.pools.remove(pool_address)
    }
}

// keccak256(pool || start_tick_index as little endian)
fn derive_tick_array_address(pool_address: &Address, start_tick_index: i32) -> Address {
    let mut seed = [0u8; 36];
    seed[..32].copy_from_slice(pool_address.as_slice());
    seed[32..].copy_from_slice(&start_tick_index.to_le_bytes());
    keccak256(seed)
}

#[async_trait]
impl PoolDataSource for InMemoryDataSource {
    type Error = Infallible;

    async fn get_pool(&self, pool_address: &Address) -> Result<Option<Whirlpool>, Self::Error> {
        Ok(self.pools.get(pool_address).cloned())
    }

    async fn get_tick_arrays(
        &self,
        addresses: &[Address],
    ) -> Result<FastMap<Address, TickArray>, Self::Error> {
        Ok(addresses
            .iter()
            .filter_map(|address| {
                self.tick_arrays
                    .get(address)
                    .map(|tick_array| (*address, tick_array.clone()))
            })
            .collect())
    }

    fn tick_array_address(&self, pool_address: &Address, start_tick_index: i32) -> Address {
        derive_tick_array_address(pool_address, start_tick_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_address() -> Address {
        Address::repeat_byte(0x11)
    }

    #[test]
    fn addresses_are_keyed_by_pool_and_start() {
        let source = InMemoryDataSource::new();
        let a = source.tick_array_address(&pool_address(), 0);
        assert_eq!(a, source.tick_array_address(&pool_address(), 0));
        assert_ne!(a, source.tick_array_address(&pool_address(), 5632));
        assert_ne!(a, source.tick_array_address(&Address::repeat_byte(0x12), 0));
    }

    #[tokio::test]
    async fn missing_pool_is_none() {
        let source = InMemoryDataSource::new();
        assert_eq!(source.get_pool(&pool_address()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn stored_pool_is_returned() {
        let mut source = InMemoryDataSource::new();
        let pool = Whirlpool::new(Address::repeat_byte(1), Address::repeat_byte(2), 64, 3000);
        source.insert_pool(pool_address(), pool.clone());
        assert_eq!(source.get_pool(&pool_address()).await.unwrap(), Some(pool));

        source.remove_pool(&pool_address());
        assert_eq!(source.get_pool(&pool_address()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_tick_arrays_are_omitted() {
        let mut source = InMemoryDataSource::new();
        let stored = source.insert_tick_array(&pool_address(), TickArray::new(-5632));
        let missing = source.tick_array_address(&pool_address(), 0);

        let fetched = source.get_tick_arrays(&[stored, missing]).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[&stored].start_tick_index, -5632);
        assert!(!fetched.contains_key(&missing));
    }
}
