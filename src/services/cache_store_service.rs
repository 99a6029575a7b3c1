use crate::models::candidate::{CacheEntry, CacheKey, Candidate};
use crate::models::location::DistrictContext;
use crate::services::collaborators::KnowledgeCache;
use log::{debug, warn};
use std::sync::Arc;

/// Read/write access to verified POI records keyed by subcategory + district.
/// Store failures never escape: reads degrade to a miss, writes are logged.
#[derive(Clone)]
pub struct CacheStoreAdapter {
    cache: Arc<dyn KnowledgeCache>,
}

impl CacheStoreAdapter {
    pub fn new(cache: Arc<dyn KnowledgeCache>) -> Self {
        Self { cache }
    }

    pub async fn lookup(&self, subcategory: &str, district: &DistrictContext) -> Option<CacheEntry> {
        let key = CacheKey::new(subcategory, district);
        match self.cache.get(&key).await {
            Ok(entry) => {
                debug!(
                    "Cache {} for {} in {}",
                    if entry.is_some() { "hit" } else { "miss" },
                    subcategory,
                    district.district_name
                );
                entry
            }
            Err(e) => {
                warn!("Knowledge cache unavailable, treating as miss: {}", e);
                None
            }
        }
    }

    pub async fn store(&self, subcategory: &str, district: &DistrictContext, candidate: &Candidate) {
        let entry = CacheEntry::from_candidate(CacheKey::new(subcategory, district), candidate);
        if let Err(e) = self.cache.put(entry).await {
            warn!("Failed to cache '{}': {}", candidate.name, e);
        }
    }

    pub async fn rejected_names(&self, subcategory: &str, district: &DistrictContext) -> Vec<String> {
        let key = CacheKey::new(subcategory, district);
        self.cache.rejected_names(&key).await.unwrap_or_else(|e| {
            warn!("Could not load rejected names for {}: {}", subcategory, e);
            Vec::new()
        })
    }

    pub async fn record_rejection(&self, subcategory: &str, district: &DistrictContext, name: &str) {
        let key = CacheKey::new(subcategory, district);
        if let Err(e) = self.cache.record_rejection(&key, name).await {
            warn!("Failed to record rejected name '{}': {}", name, e);
        }
    }
}
