//! Interfaces to the systems the discovery engine delegates to.

use crate::error::{ServiceError, StoreError};
use crate::models::candidate::{CacheEntry, CacheKey, VerifiedPlace};
use crate::models::catalog::MacroCategory;
use crate::models::location::{DistrictContext, RegionScope};
use crate::models::reward::{Promotion, PromotionLookup, RewardRecord};
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait LocationStore: Send + Sync {
    /// A random district inside `scope`, or `None` when the scope has none.
    async fn random_district(&self, scope: RegionScope)
        -> Result<Option<DistrictContext>, StoreError>;

    /// Live POI counts per macro-category for the district's parent region.
    async fn category_inventory(
        &self,
        district: &DistrictContext,
    ) -> Result<HashMap<MacroCategory, u64>, StoreError>;
}

#[async_trait]
pub trait KnowledgeCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError>;

    async fn put(&self, entry: CacheEntry) -> Result<(), StoreError>;

    /// Names the AI proposed for `key` in earlier runs that failed verification.
    async fn rejected_names(&self, key: &CacheKey) -> Result<Vec<String>, StoreError>;

    async fn record_rejection(&self, key: &CacheKey, name: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError>;
}

#[async_trait]
pub trait PlaceVerifier: Send + Sync {
    /// At most one real place matching `query` near `district`.
    async fn find_place(
        &self,
        query: &str,
        district: &DistrictContext,
    ) -> Result<Option<VerifiedPlace>, ServiceError>;
}

#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn collected_place_names(&self, user_id: &str) -> Result<Vec<String>, StoreError>;

    /// Number of occupied reward slots in the user's inventory.
    async fn inventory_count(&self, user_id: &str) -> Result<usize, StoreError>;

    async fn insert_reward(&self, record: &RewardRecord) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PromotionStore: Send + Sync {
    async fn active_promotion(
        &self,
        lookup: &PromotionLookup<'_>,
    ) -> Result<Option<Promotion>, StoreError>;
}
