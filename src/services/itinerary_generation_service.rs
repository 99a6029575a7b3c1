use crate::error::DiscoveryError;
use crate::models::candidate::CandidateOrigin;
use crate::models::catalog::MacroCategory;
use crate::models::itinerary::{
    DiscoveryMeta, DiscoveryRequest, DiscoveryResponse, DistrictSummary, ItineraryItem,
};
use crate::models::location::{DistrictContext, RegionScope};
use crate::services::backfill_service::BackfillLoop;
use crate::services::cache_store_service::CacheStoreAdapter;
use crate::services::candidate_resolver_service::CandidateResolver;
use crate::services::collaborators::{
    CollectionStore, KnowledgeCache, LocationStore, PlaceVerifier, PromotionStore, TextGenerator,
};
use crate::services::dedup_service::{dedupe, normalize_name};
use crate::services::discovery_config::DiscoveryConfig;
use crate::services::place_verification_service::VerificationGate;
use crate::services::quota_planner_service::QuotaPlanner;
use crate::services::reward_engine_service::RewardEngine;
use crate::services::route_sequencer_service::RouteSequencer;
use crate::services::worker_dispatcher_service::{RunContext, WorkerDispatcher};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// Every external system the generator talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub locations: Arc<dyn LocationStore>,
    pub cache: Arc<dyn KnowledgeCache>,
    pub generator: Arc<dyn TextGenerator>,
    pub verifier: Arc<dyn PlaceVerifier>,
    pub collections: Arc<dyn CollectionStore>,
    pub promotions: Arc<dyn PromotionStore>,
}

pub struct ItineraryGenerator {
    locations: Arc<dyn LocationStore>,
    collections: Arc<dyn CollectionStore>,
    dispatcher: WorkerDispatcher,
    backfill: BackfillLoop,
    rewards: RewardEngine,
    config: Arc<DiscoveryConfig>,
}

impl ItineraryGenerator {
    pub fn new(collaborators: Collaborators) -> Self {
        Self::with_config(collaborators, DiscoveryConfig::from_env())
    }

    pub fn with_config(collaborators: Collaborators, config: DiscoveryConfig) -> Self {
        let config = Arc::new(config);
        let gate = VerificationGate::new(
            collaborators.verifier,
            config.verification_radius_km,
            config.verification_timeout,
        );
        let resolver = Arc::new(CandidateResolver::new(
            CacheStoreAdapter::new(collaborators.cache),
            collaborators.generator,
            gate,
            config.clone(),
        ));

        Self {
            locations: collaborators.locations,
            collections: collaborators.collections.clone(),
            dispatcher: WorkerDispatcher::new(resolver.clone()),
            backfill: BackfillLoop::new(resolver, config.clone()),
            rewards: RewardEngine::new(collaborators.promotions, collaborators.collections, &config),
            config,
        }
    }

    /// Generate a one-day itinerary for a random district in the requested
    /// region or country.
    pub async fn generate_itinerary(
        &self,
        request: &DiscoveryRequest,
    ) -> Result<DiscoveryResponse, DiscoveryError> {
        let started = Instant::now();
        let deadline = started + self.config.request_deadline;

        let scope = Self::scope_of(request)?;
        QuotaPlanner::validate_item_count(request.item_count)?;

        let district = self
            .locations
            .random_district(scope)
            .await?
            .ok_or(DiscoveryError::NoDistrictFound { scope })?;
        info!(
            "Generating {} items for {}",
            request.item_count,
            district.display_path()
        );

        let inventory = self.category_inventory(&district).await;
        let collected = self.collected_names(request.user_id.as_deref()).await;

        let mut rng = StdRng::from_entropy();
        let plan = QuotaPlanner::plan(request.item_count, &inventory, &mut rng)?;
        let worker_plans = WorkerDispatcher::prepare(plan.slots, &inventory, &mut rng);

        let run = RunContext {
            district,
            language: request.language,
            collected,
            exclusions: Vec::new(),
        };

        let candidates = self.dispatcher.dispatch(worker_plans, &run).await;
        let mut candidates = dedupe(candidates);

        let pool = BackfillLoop::unused_pool(&candidates, &mut rng);
        let backfill = self
            .backfill
            .fill(&mut candidates, request.item_count, pool, &run, deadline)
            .await;

        let sequenced = RouteSequencer::sequence(candidates);
        let mut items: Vec<ItineraryItem> = sequenced
            .into_iter()
            .enumerate()
            .map(|(idx, candidate)| ItineraryItem::from_candidate(idx + 1, candidate))
            .collect();

        let rewards_granted = self
            .rewards
            .apply(&mut items, &run.district, request.user_id.as_deref())
            .await;

        let meta = DiscoveryMeta {
            requested_count: request.item_count,
            returned_count: items.len(),
            cache_hits: count_origin(&items, CandidateOrigin::Cache),
            ai_generated: count_origin(&items, CandidateOrigin::Generated),
            unverified_count: items.iter().filter(|i| !i.verified).count(),
            rewards_granted,
            shortage_warning: backfill.shortage_warning,
        };

        info!(
            "Itinerary for {} ready in {:?}: {}/{} items, {} from cache, {} generated, {} backfilled",
            run.district.district_name,
            started.elapsed(),
            meta.returned_count,
            meta.requested_count,
            meta.cache_hits,
            meta.ai_generated,
            backfill.added
        );

        Ok(DiscoveryResponse {
            district: DistrictSummary::from(&run.district),
            items,
            meta,
        })
    }

    fn scope_of(request: &DiscoveryRequest) -> Result<RegionScope, DiscoveryError> {
        match (request.region_id, request.country_id) {
            (Some(region_id), _) => Ok(RegionScope::Region(region_id)),
            (None, Some(country_id)) => Ok(RegionScope::Country(country_id)),
            (None, None) => Err(DiscoveryError::Configuration(
                "regionId or countryId is required".to_string(),
            )),
        }
    }

    async fn category_inventory(&self, district: &DistrictContext) -> HashMap<MacroCategory, u64> {
        self.locations
            .category_inventory(district)
            .await
            .unwrap_or_else(|e| {
                warn!("Category inventory unavailable, drawing uniformly: {}", e);
                HashMap::new()
            })
    }

    async fn collected_names(&self, user_id: Option<&str>) -> HashSet<String> {
        let Some(user_id) = user_id else {
            return HashSet::new();
        };
        match self.collections.collected_place_names(user_id).await {
            Ok(names) => names.iter().map(|n| normalize_name(n)).collect(),
            Err(e) => {
                warn!("Collection store unavailable for {}: {}", user_id, e);
                HashSet::new()
            }
        }
    }
}

fn count_origin(items: &[ItineraryItem], origin: CandidateOrigin) -> usize {
    items.iter().filter(|i| i.origin == origin).count()
}
