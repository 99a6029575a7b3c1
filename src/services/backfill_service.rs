use crate::models::candidate::Candidate;
use crate::models::catalog::{MacroCategory, Window};
use crate::models::slot::{Slot, TimeSlot, WorkerKind};
use crate::services::candidate_resolver_service::{CandidateResolver, ResolveContext};
use crate::services::dedup_service::DedupIndex;
use crate::services::discovery_config::DiscoveryConfig;
use crate::services::worker_dispatcher_service::RunContext;
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct BackfillOutcome {
    pub attempts: usize,
    pub added: usize,
    /// Localized message when the target could not be reached.
    pub shortage_warning: Option<String>,
}

/// Sequential best-effort passes that top up a short itinerary.
pub struct BackfillLoop {
    resolver: Arc<CandidateResolver>,
    config: Arc<DiscoveryConfig>,
}

impl BackfillLoop {
    pub fn new(resolver: Arc<CandidateResolver>, config: Arc<DiscoveryConfig>) -> Self {
        Self { resolver, config }
    }

    /// Every activity-pool subcategory not yet represented in `items`, shuffled.
    pub fn unused_pool<R: Rng + ?Sized>(
        items: &[Candidate],
        rng: &mut R,
    ) -> Vec<(MacroCategory, &'static str, Window)> {
        let used: HashSet<&str> = items
            .iter()
            .filter_map(|c| c.slot.subcategory.as_deref())
            .collect();

        let mut pool: Vec<(MacroCategory, &'static str, Window)> = MacroCategory::ACTIVITY_POOL
            .iter()
            .flat_map(|category| {
                category
                    .subcategories()
                    .iter()
                    .map(move |s| (*category, s.name, s.window))
            })
            .filter(|(_, name, _)| !used.contains(name))
            .collect();
        pool.shuffle(rng);
        pool
    }

    /// Resolves pool entries one at a time until `target` is reached, the pool
    /// runs dry, `backfill_attempt_factor * shortfall` attempts are spent, or
    /// the request deadline passes.
    pub async fn fill(
        &self,
        items: &mut Vec<Candidate>,
        target: usize,
        pool: Vec<(MacroCategory, &'static str, Window)>,
        run: &RunContext,
        deadline: Instant,
    ) -> BackfillOutcome {
        let shortfall = target.saturating_sub(items.len());
        let mut outcome = BackfillOutcome::default();
        if shortfall == 0 {
            return outcome;
        }

        info!(
            "Backfilling {} missing items for {}",
            shortfall, run.district.district_name
        );

        let max_attempts = shortfall * self.config.backfill_attempt_factor;
        let mut index = DedupIndex::new();
        for candidate in items.iter() {
            index.insert(candidate);
        }

        let ctx = ResolveContext {
            district: &run.district,
            language: run.language,
            collected: &run.collected,
            exclusions: &[],
        };

        for (category, subcategory, window) in pool {
            if items.len() >= target || outcome.attempts >= max_attempts {
                break;
            }
            if Instant::now() >= deadline {
                warn!("Request deadline reached during backfill");
                break;
            }
            outcome.attempts += 1;

            let (worker, time_slot) = match window {
                Window::Nighttime => (WorkerKind::Night, TimeSlot::Night),
                _ => (WorkerKind::Afternoon, TimeSlot::Afternoon),
            };
            let slot = Slot::new(category, time_slot, worker).with_subcategory(subcategory);

            let candidate = self.resolver.resolve(&slot, &ctx).await;
            if candidate.is_placeholder() || !index.insert(&candidate) {
                continue;
            }
            items.push(candidate);
            outcome.added += 1;
        }

        if items.len() < target {
            warn!(
                "Shortage in {}: {} of {} items after {} backfill attempts",
                run.district.district_name,
                items.len(),
                target,
                outcome.attempts
            );
            outcome.shortage_warning = Some(run.language.shortage_message(
                items.len(),
                target,
                &run.district.district_name,
            ));
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_unused_pool_skips_represented_subcategories() {
        let slot = Slot::new(MacroCategory::Scenery, TimeSlot::Morning, WorkerKind::Morning)
            .with_subcategory("temple");
        let items = vec![Candidate::unverified("A".into(), String::new(), "w".into(), &slot)];

        let mut rng = StdRng::seed_from_u64(3);
        let pool = BackfillLoop::unused_pool(&items, &mut rng);
        assert!(pool.iter().all(|(_, name, _)| *name != "temple"));
        assert!(pool.iter().all(|(category, _, _)| *category != MacroCategory::Food));
        assert!(pool.iter().any(|(_, name, _)| *name == "park"));
    }
}
