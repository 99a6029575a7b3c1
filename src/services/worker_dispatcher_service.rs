//! Worker Dispatcher
//!
//! Splits the slot plan into time-of-day workers (morning, afternoon, evening,
//! night). Workers run concurrently and each resolves its own slots
//! concurrently. A worker only reads the shared run context and its own
//! exclusion snapshot; cross-worker duplicates are left to the global
//! dedup pass that runs after every worker has finished.

use crate::models::candidate::Candidate;
use crate::models::catalog::{MacroCategory, BREAKFAST_SUBCATEGORIES};
use crate::models::location::{DistrictContext, Language};
use crate::models::slot::{Slot, TimeSlot, WorkerKind};
use crate::services::candidate_resolver_service::{CandidateResolver, ResolveContext};
use crate::services::dedup_service::dedupe;
use futures::future::join_all;
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Re-draws allowed after a subcategory collides with one the worker used.
const MAX_REDRAWS: usize = 3;

/// Read-only state shared by every worker of one run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub district: DistrictContext,
    pub language: Language,
    pub collected: HashSet<String>,
    pub exclusions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct WorkerPlan {
    pub worker: WorkerKind,
    pub slots: Vec<Slot>,
}

pub struct WorkerDispatcher {
    resolver: Arc<CandidateResolver>,
}

impl WorkerDispatcher {
    pub fn new(resolver: Arc<CandidateResolver>) -> Self {
        Self { resolver }
    }

    /// Groups slots by worker in merge-priority order and assigns each slot a
    /// subcategory. Slots that cannot get one are dropped. Open slots that
    /// collide only redraw into categories the district has stock for.
    pub fn prepare<R: Rng + ?Sized>(
        slots: Vec<Slot>,
        inventory: &HashMap<MacroCategory, u64>,
        rng: &mut R,
    ) -> Vec<WorkerPlan> {
        let mut plans: Vec<WorkerPlan> = WorkerKind::ORDER
            .iter()
            .map(|worker| WorkerPlan {
                worker: *worker,
                slots: slots.iter().filter(|s| s.worker == *worker).cloned().collect(),
            })
            .filter(|plan| !plan.slots.is_empty())
            .collect();

        for plan in &mut plans {
            Self::assign_subcategories(plan, inventory, rng);
        }
        plans
    }

    fn assign_subcategories<R: Rng + ?Sized>(
        plan: &mut WorkerPlan,
        inventory: &HashMap<MacroCategory, u64>,
        rng: &mut R,
    ) {
        let mut used: HashSet<&'static str> = HashSet::new();
        let mut assigned = Vec::with_capacity(plan.slots.len());

        for mut slot in plan.slots.drain(..) {
            match pick_subcategory(&slot, &used, inventory, rng) {
                Some((category, name)) => {
                    used.insert(name);
                    slot.macro_category = category;
                    slot.energy = category.energy();
                    slot.subcategory = Some(name.to_string());
                    assigned.push(slot);
                }
                None => warn!(
                    "{:?} worker gave up on a {} slot at {}",
                    plan.worker,
                    slot.macro_category,
                    slot.time_slot.as_str()
                ),
            }
        }

        plan.slots = assigned;
    }

    /// Runs every worker to completion. Output is in worker-priority order
    /// with intra-worker duplicates already removed.
    pub async fn dispatch(&self, plans: Vec<WorkerPlan>, run: &RunContext) -> Vec<Candidate> {
        let workers = plans.into_iter().map(|plan| self.run_worker(plan, run));
        join_all(workers).await.into_iter().flatten().collect()
    }

    async fn run_worker(&self, plan: WorkerPlan, run: &RunContext) -> Vec<Candidate> {
        let exclusions = run.exclusions.clone();
        let ctx = ResolveContext {
            district: &run.district,
            language: run.language,
            collected: &run.collected,
            exclusions: &exclusions,
        };

        let resolutions = plan.slots.iter().map(|slot| self.resolver.resolve(slot, &ctx));
        let candidates = join_all(resolutions).await;
        let resolved = candidates.len();
        let unique = dedupe(candidates);

        info!(
            "{:?} worker resolved {} slots ({} unique, {} verified)",
            plan.worker,
            resolved,
            unique.len(),
            unique.iter().filter(|c| c.verified).count()
        );
        unique
    }
}

/// Subcategories of `category` the slot's worker may visit.
fn allowed_subcategories(category: MacroCategory, slot: &Slot) -> Vec<&'static str> {
    let subcategories = if category == MacroCategory::Food && slot.time_slot == TimeSlot::Breakfast {
        BREAKFAST_SUBCATEGORIES
    } else {
        category.subcategories()
    };
    subcategories
        .iter()
        .filter(|s| slot.worker.allows(s.window))
        .map(|s| s.name)
        .collect()
}

/// Picks a subcategory the worker has not used yet. Fixed slots draw within
/// their own category; open slots start from the planned category and, on a
/// collision, redraw uniformly across the stocked part of the activity pool.
/// With no stocked category the whole pool is open.
fn pick_subcategory<R: Rng + ?Sized>(
    slot: &Slot,
    used: &HashSet<&'static str>,
    inventory: &HashMap<MacroCategory, u64>,
    rng: &mut R,
) -> Option<(MacroCategory, &'static str)> {
    let reachable: Vec<MacroCategory> = MacroCategory::ACTIVITY_POOL
        .iter()
        .copied()
        .filter(|c| !allowed_subcategories(*c, slot).is_empty())
        .collect();
    let stocked: Vec<MacroCategory> = reachable
        .iter()
        .copied()
        .filter(|c| inventory.get(c).copied().unwrap_or(0) > 0)
        .collect();
    let open_categories = if stocked.is_empty() { reachable } else { stocked };

    let mut category = if slot.is_fixed() || !allowed_subcategories(slot.macro_category, slot).is_empty() {
        slot.macro_category
    } else {
        *open_categories.choose(rng)?
    };

    for _ in 0..=MAX_REDRAWS {
        if let Some(name) = allowed_subcategories(category, slot).choose(rng).copied() {
            if !used.contains(name) {
                return Some((category, name));
            }
        }
        if !slot.is_fixed() {
            category = *open_categories.choose(rng)?;
        }
    }

    None
}
