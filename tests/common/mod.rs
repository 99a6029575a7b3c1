#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use daytrip_api::error::{ServiceError, StoreError};
use daytrip_api::models::candidate::{CacheEntry, CacheKey, VerifiedPlace};
use daytrip_api::models::catalog::MacroCategory;
use daytrip_api::models::location::{Coordinates, DistrictContext, RegionScope};
use daytrip_api::models::reward::{
    Promotion, PromotionLookup, RewardRecord, RewardTemplate, RewardTier,
};
use daytrip_api::services::collaborators::{
    CollectionStore, KnowledgeCache, LocationStore, PlaceVerifier, PromotionStore, TextGenerator,
};
use daytrip_api::services::discovery_config::DiscoveryConfig;
use daytrip_api::services::itinerary_generation_service::{Collaborators, ItineraryGenerator};

pub fn wanhua() -> DistrictContext {
    DistrictContext {
        district_id: 101,
        district_name: "Wanhua".to_string(),
        region_id: 10,
        region_name: "Taipei".to_string(),
        country_id: 1,
        country_name: "Taiwan".to_string(),
        centroid: None,
    }
}

/// No cache draws, no backoff sleeps, every promotion hits tier R.
pub fn test_config() -> DiscoveryConfig {
    DiscoveryConfig {
        cache_probability: 0.0,
        retry_backoff: Duration::ZERO,
        reward_tiers: vec![(RewardTier::R, 1.0)],
        ..Default::default()
    }
}

pub fn completion(name: &str) -> String {
    format!(
        r#"{{"name": "{}", "description": "A well known local spot."}}"#,
        name
    )
}

// ---- Location store ----

pub struct FakeLocationStore {
    pub district: Option<DistrictContext>,
    pub inventory: HashMap<MacroCategory, u64>,
    pub scopes: Mutex<Vec<RegionScope>>,
}

impl FakeLocationStore {
    pub fn with(district: Option<DistrictContext>) -> Self {
        Self {
            district,
            inventory: HashMap::new(),
            scopes: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LocationStore for FakeLocationStore {
    async fn random_district(
        &self,
        scope: RegionScope,
    ) -> Result<Option<DistrictContext>, StoreError> {
        self.scopes.lock().unwrap().push(scope);
        Ok(self.district.clone())
    }

    async fn category_inventory(
        &self,
        _district: &DistrictContext,
    ) -> Result<HashMap<MacroCategory, u64>, StoreError> {
        Ok(self.inventory.clone())
    }
}

/// Location hierarchy that cannot be reached.
pub struct OfflineLocationStore;

#[async_trait]
impl LocationStore for OfflineLocationStore {
    async fn random_district(
        &self,
        _scope: RegionScope,
    ) -> Result<Option<DistrictContext>, StoreError> {
        Err(StoreError::Unavailable("locations offline".to_string()))
    }

    async fn category_inventory(
        &self,
        _district: &DistrictContext,
    ) -> Result<HashMap<MacroCategory, u64>, StoreError> {
        Err(StoreError::Unavailable("locations offline".to_string()))
    }
}

// ---- Knowledge cache ----

#[derive(Default)]
pub struct FakeCache {
    pub entries: Mutex<HashMap<CacheKey, Vec<CacheEntry>>>,
    pub rejected: Mutex<HashMap<CacheKey, Vec<String>>>,
}

impl FakeCache {
    pub fn seed(&self, entry: CacheEntry) {
        self.entries
            .lock()
            .unwrap()
            .entry(entry.key.clone())
            .or_default()
            .push(entry);
    }

    pub fn rejected_for(&self, key: &CacheKey) -> Vec<String> {
        self.rejected
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl KnowledgeCache for FakeCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(key)
            .and_then(|entries| entries.first().cloned()))
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), StoreError> {
        self.seed(entry);
        Ok(())
    }

    async fn rejected_names(&self, key: &CacheKey) -> Result<Vec<String>, StoreError> {
        Ok(self.rejected_for(key))
    }

    async fn record_rejection(&self, key: &CacheKey, name: &str) -> Result<(), StoreError> {
        self.rejected
            .lock()
            .unwrap()
            .entry(key.clone())
            .or_default()
            .push(name.to_string());
        Ok(())
    }
}

/// Fails every call; the engine must treat it as a miss.
pub struct BrokenCache;

#[async_trait]
impl KnowledgeCache for BrokenCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
        Err(StoreError::Unavailable("cache offline".to_string()))
    }

    async fn put(&self, _entry: CacheEntry) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("cache offline".to_string()))
    }

    async fn rejected_names(&self, _key: &CacheKey) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unavailable("cache offline".to_string()))
    }

    async fn record_rejection(&self, _key: &CacheKey, _name: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("cache offline".to_string()))
    }
}

// ---- Text generator ----

/// Replays scripted completions, then falls back to "Spot N" names.
#[derive(Default)]
pub struct ScriptedGenerator {
    pub script: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<String>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.prompts.lock().unwrap().push(prompt.to_string());
        let scripted = self.script.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(|| completion(&format!("Spot {}", n))))
    }
}

/// Cycles through a fixed list of names, so runs produce duplicates.
pub struct CyclingGenerator {
    names: Vec<String>,
    calls: AtomicUsize,
}

impl CyclingGenerator {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TextGenerator for CyclingGenerator {
    async fn complete(&self, _prompt: &str) -> Result<String, ServiceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(completion(&self.names[n % self.names.len()]))
    }
}

// ---- Place verifier ----

/// Confirms every query as a real place named exactly like the query.
#[derive(Default)]
pub struct EchoVerifier {
    calls: AtomicUsize,
}

impl EchoVerifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaceVerifier for EchoVerifier {
    async fn find_place(
        &self,
        query: &str,
        _district: &DistrictContext,
    ) -> Result<Option<VerifiedPlace>, ServiceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(VerifiedPlace {
            place_id: format!("place:{}", query.to_lowercase()),
            name: query.to_string(),
            address: Some(format!("{} Road, Wanhua", n + 1)),
            rating: Some(4.2),
            coordinates: Coordinates::new(25.03 + (n % 7) as f64 * 0.002, 121.49 + n as f64 * 0.001),
        }))
    }
}

/// Never finds anything.
#[derive(Default)]
pub struct MissingVerifier {
    calls: AtomicUsize,
}

impl MissingVerifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaceVerifier for MissingVerifier {
    async fn find_place(
        &self,
        _query: &str,
        _district: &DistrictContext,
    ) -> Result<Option<VerifiedPlace>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }
}

// ---- User collections & rewards ----

#[derive(Default)]
pub struct FakeCollectionStore {
    pub collected: Vec<String>,
    pub occupied: usize,
    pub inserted: Mutex<Vec<RewardRecord>>,
}

impl FakeCollectionStore {
    pub fn with_occupied(occupied: usize) -> Self {
        Self {
            occupied,
            ..Default::default()
        }
    }

    pub fn inserted_count(&self) -> usize {
        self.inserted.lock().unwrap().len()
    }
}

#[async_trait]
impl CollectionStore for FakeCollectionStore {
    async fn collected_place_names(&self, _user_id: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.collected.clone())
    }

    async fn inventory_count(&self, _user_id: &str) -> Result<usize, StoreError> {
        Ok(self.occupied + self.inserted_count())
    }

    async fn insert_reward(&self, record: &RewardRecord) -> Result<(), StoreError> {
        self.inserted.lock().unwrap().push(record.clone());
        Ok(())
    }
}

// ---- Promotions ----

/// Every place carries the same promotion when `eligible` is set.
pub struct FakePromotionStore {
    pub eligible: bool,
    pub validity_days: Option<u32>,
}

impl FakePromotionStore {
    pub fn eligible() -> Self {
        Self {
            eligible: true,
            validity_days: None,
        }
    }
}

#[async_trait]
impl PromotionStore for FakePromotionStore {
    async fn active_promotion(
        &self,
        _lookup: &PromotionLookup<'_>,
    ) -> Result<Option<Promotion>, StoreError> {
        if !self.eligible {
            return Ok(None);
        }
        let mut templates = HashMap::new();
        templates.insert(
            RewardTier::R,
            RewardTemplate {
                title: "10% off".to_string(),
                validity_days: self.validity_days,
            },
        );
        Ok(Some(Promotion {
            merchant_id: "merchant-1".to_string(),
            promotion_id: "promo-1".to_string(),
            templates,
        }))
    }
}

// ---- Wiring ----

pub struct TestEngine {
    pub locations: Arc<FakeLocationStore>,
    pub location_override: Option<Arc<dyn LocationStore>>,
    pub cache: Arc<FakeCache>,
    pub generator: Arc<dyn TextGenerator>,
    pub verifier: Arc<dyn PlaceVerifier>,
    pub collections: Arc<FakeCollectionStore>,
    pub promotions: Arc<FakePromotionStore>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self {
            locations: Arc::new(FakeLocationStore::with(Some(wanhua()))),
            location_override: None,
            cache: Arc::new(FakeCache::default()),
            generator: Arc::new(ScriptedGenerator::default()),
            verifier: Arc::new(EchoVerifier::default()),
            collections: Arc::new(FakeCollectionStore::default()),
            promotions: Arc::new(FakePromotionStore {
                eligible: false,
                validity_days: None,
            }),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            locations: self
                .location_override
                .clone()
                .unwrap_or_else(|| self.locations.clone() as Arc<dyn LocationStore>),
            cache: self.cache.clone(),
            generator: self.generator.clone(),
            verifier: self.verifier.clone(),
            collections: self.collections.clone(),
            promotions: self.promotions.clone(),
        }
    }

    pub fn build(&self, config: DiscoveryConfig) -> ItineraryGenerator {
        ItineraryGenerator::with_config(self.collaborators(), config)
    }
}
