//! Quota Planner
//!
//! Decides how many slots of each macro-category an itinerary of size N gets
//! and lays them out on the day timeline, already grouped by worker.
//!
//! - Food: 2 slots up to N = 7, 3 from N = 8 (breakfast is added).
//! - Stay: 1 slot from N = 9, always at the overnight position.
//! - Everything else is drawn from the activity pool, weighted by how many
//!   live POIs the region holds per category.
//! - Never more than 2 high-energy slots in a row.

use crate::error::DiscoveryError;
use crate::models::catalog::{EnergyLevel, MacroCategory};
use crate::models::slot::{Slot, TimeSlot, WorkerKind};
use crate::services::discovery_config::{MAX_ITEM_COUNT, MIN_ITEM_COUNT};
use log::debug;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

const MAX_HIGH_ENERGY_STREAK: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Meal(TimeSlot),
    Open(TimeSlot),
    Stay,
}

use Position::{Meal, Open, Stay};

/// Per-worker timeline positions for an itinerary of `n` items.
fn worker_layout(n: usize) -> Vec<(WorkerKind, Vec<Position>)> {
    use TimeSlot::*;

    let morning = match n {
        5 => vec![Open(Morning)],
        6 | 7 => vec![Open(Morning), Open(Morning)],
        _ => vec![Meal(Breakfast), Open(Morning), Open(Morning)],
    };
    let afternoon = match n {
        5 | 6 => vec![Meal(Lunch), Open(Afternoon)],
        7..=11 => vec![Meal(Lunch), Open(Afternoon), Open(TeaTime)],
        _ => vec![Meal(Lunch), Open(Afternoon), Open(TeaTime), Open(TeaTime)],
    };
    let evening = match n {
        5..=10 => vec![Meal(Dinner), Open(Evening)],
        _ => vec![Meal(Dinner), Open(Evening), Open(Evening)],
    };
    let night = match n {
        5..=8 => vec![],
        9 => vec![Stay],
        _ => vec![Open(Night), Stay],
    };

    vec![
        (WorkerKind::Morning, morning),
        (WorkerKind::Afternoon, afternoon),
        (WorkerKind::Evening, evening),
        (WorkerKind::Night, night),
    ]
}

pub fn food_quota(n: usize) -> usize {
    if n <= 7 {
        2
    } else {
        3
    }
}

pub fn stay_quota(n: usize) -> usize {
    if n >= 9 {
        1
    } else {
        0
    }
}

#[derive(Debug, Clone)]
pub struct QuotaPlan {
    /// Slots in timeline order.
    pub slots: Vec<Slot>,
    pub food: usize,
    pub stay: usize,
    pub remaining: usize,
}

impl QuotaPlan {
    pub fn count(&self, category: MacroCategory) -> usize {
        self.slots
            .iter()
            .filter(|s| s.macro_category == category)
            .count()
    }
}

pub struct QuotaPlanner;

impl QuotaPlanner {
    pub fn validate_item_count(n: usize) -> Result<(), DiscoveryError> {
        if !(MIN_ITEM_COUNT..=MAX_ITEM_COUNT).contains(&n) {
            return Err(DiscoveryError::Configuration(format!(
                "itemCount must be between {} and {}, got {}",
                MIN_ITEM_COUNT, MAX_ITEM_COUNT, n
            )));
        }
        Ok(())
    }

    /// Build the slot plan for `n` items given live inventory per category.
    pub fn plan<R: Rng + ?Sized>(
        n: usize,
        inventory: &HashMap<MacroCategory, u64>,
        rng: &mut R,
    ) -> Result<QuotaPlan, DiscoveryError> {
        Self::validate_item_count(n)?;

        let mut slots = Vec::with_capacity(n);
        let mut streak = 0usize;

        for (worker, positions) in worker_layout(n) {
            for position in positions {
                let slot = match position {
                    Meal(time_slot) => Slot::new(MacroCategory::Food, time_slot, worker),
                    Stay => Slot::new(MacroCategory::Stay, TimeSlot::Overnight, worker),
                    Open(time_slot) => {
                        let force_low = streak >= MAX_HIGH_ENERGY_STREAK;
                        let category = Self::draw_category(inventory, force_low, rng);
                        Slot::new(category, time_slot, worker)
                    }
                };

                if slot.energy == EnergyLevel::High {
                    streak += 1;
                } else {
                    streak = 0;
                }
                slots.push(slot);
            }
        }

        let plan = QuotaPlan {
            food: food_quota(n),
            stay: stay_quota(n),
            remaining: n - food_quota(n) - stay_quota(n),
            slots,
        };
        debug!(
            "Quota plan for {} items: food={}, stay={}, remaining={}",
            n, plan.food, plan.stay, plan.remaining
        );
        Ok(plan)
    }

    /// Weighted draw over the activity pool. Categories with no live inventory
    /// cannot be drawn; if nothing has inventory the draw is uniform.
    /// A forced low-energy pick prefers stocked shopping, then stocked
    /// entertainment, and is shopping regardless of inventory otherwise.
    fn draw_category<R: Rng + ?Sized>(
        inventory: &HashMap<MacroCategory, u64>,
        force_low: bool,
        rng: &mut R,
    ) -> MacroCategory {
        let weight = |category: &MacroCategory| inventory.get(category).copied().unwrap_or(0);
        let any_inventory = MacroCategory::ACTIVITY_POOL.iter().any(|c| weight(c) > 0);

        if force_low {
            return [MacroCategory::Shopping, MacroCategory::Entertainment]
                .into_iter()
                .find(|preferred| weight(preferred) > 0)
                .unwrap_or(MacroCategory::Shopping);
        }

        if any_inventory {
            let weights: Vec<u64> = MacroCategory::ACTIVITY_POOL.iter().map(weight).collect();
            if let Ok(index) = WeightedIndex::new(&weights) {
                return MacroCategory::ACTIVITY_POOL[index.sample(rng)];
            }
        }

        *MacroCategory::ACTIVITY_POOL
            .choose(rng)
            .unwrap_or(&MacroCategory::Scenery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn full_inventory() -> HashMap<MacroCategory, u64> {
        MacroCategory::ACTIVITY_POOL
            .iter()
            .map(|c| (*c, 40))
            .collect()
    }

    #[test]
    fn test_slot_counts_sum_to_requested_size() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in MIN_ITEM_COUNT..=MAX_ITEM_COUNT {
            let plan = QuotaPlanner::plan(n, &full_inventory(), &mut rng).unwrap();
            assert_eq!(plan.slots.len(), n);
            assert_eq!(plan.food + plan.stay + plan.remaining, n);
            assert_eq!(plan.count(MacroCategory::Food), plan.food, "food for n={}", n);
            assert_eq!(plan.count(MacroCategory::Stay), plan.stay, "stay for n={}", n);
        }
    }

    #[test]
    fn test_eight_items_has_three_meals_and_no_stay() {
        let mut rng = StdRng::seed_from_u64(1);
        let plan = QuotaPlanner::plan(8, &full_inventory(), &mut rng).unwrap();
        assert_eq!(plan.food, 3);
        assert_eq!(plan.stay, 0);
        assert_eq!(plan.remaining, 5);
        assert_eq!(plan.slots[0].time_slot, TimeSlot::Breakfast);
    }

    #[test]
    fn test_nine_items_adds_overnight_stay() {
        let mut rng = StdRng::seed_from_u64(2);
        let plan = QuotaPlanner::plan(9, &full_inventory(), &mut rng).unwrap();
        assert_eq!((plan.food, plan.stay, plan.remaining), (3, 1, 5));

        let stay = plan
            .slots
            .iter()
            .find(|s| s.macro_category == MacroCategory::Stay)
            .unwrap();
        assert_eq!(stay.time_slot, TimeSlot::Overnight);
        assert_eq!(stay.worker, WorkerKind::Night);
    }

    #[test]
    fn test_small_itinerary_has_two_meals() {
        let mut rng = StdRng::seed_from_u64(3);
        let plan = QuotaPlanner::plan(5, &full_inventory(), &mut rng).unwrap();
        assert_eq!(plan.food, 2);
        assert!(plan.slots.iter().all(|s| s.time_slot != TimeSlot::Breakfast));
    }

    #[test]
    fn test_out_of_range_count_is_configuration_error() {
        let mut rng = StdRng::seed_from_u64(4);
        assert!(matches!(
            QuotaPlanner::plan(4, &full_inventory(), &mut rng),
            Err(DiscoveryError::Configuration(_))
        ));
        assert!(matches!(
            QuotaPlanner::plan(13, &full_inventory(), &mut rng),
            Err(DiscoveryError::Configuration(_))
        ));
    }

    #[test]
    fn test_zero_inventory_category_is_never_drawn() {
        let mut inventory = full_inventory();
        inventory.insert(MacroCategory::Entertainment, 0);
        inventory.insert(MacroCategory::Education, 0);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = QuotaPlanner::plan(12, &inventory, &mut rng).unwrap();
            assert_eq!(plan.count(MacroCategory::Entertainment), 0);
            assert_eq!(plan.count(MacroCategory::Education), 0);
        }
    }

    #[test]
    fn test_no_more_than_two_high_energy_slots_in_a_row() {
        let mut inventory: HashMap<MacroCategory, u64> = HashMap::new();
        inventory.insert(MacroCategory::Scenery, 1000);
        inventory.insert(MacroCategory::Activity, 1000);
        inventory.insert(MacroCategory::Shopping, 1);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = QuotaPlanner::plan(12, &inventory, &mut rng).unwrap();
            let mut streak = 0;
            for slot in &plan.slots {
                if slot.energy == EnergyLevel::High {
                    streak += 1;
                } else {
                    streak = 0;
                }
                assert!(streak <= MAX_HIGH_ENERGY_STREAK, "seed {}", seed);
            }
        }
    }

    #[test]
    fn test_single_stocked_category_still_breaks_high_energy_runs() {
        let mut inventory: HashMap<MacroCategory, u64> = HashMap::new();
        inventory.insert(MacroCategory::Scenery, 100);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = QuotaPlanner::plan(12, &inventory, &mut rng).unwrap();
            let mut streak = 0;
            for slot in &plan.slots {
                if slot.energy == EnergyLevel::High {
                    streak += 1;
                } else {
                    streak = 0;
                }
                assert!(streak <= MAX_HIGH_ENERGY_STREAK, "seed {}", seed);
            }
            let open: Vec<MacroCategory> = plan
                .slots
                .iter()
                .map(|s| s.macro_category)
                .filter(|c| MacroCategory::ACTIVITY_POOL.contains(c))
                .collect();
            assert!(open
                .iter()
                .all(|c| *c == MacroCategory::Scenery || *c == MacroCategory::Shopping));
        }
    }

    #[test]
    fn test_empty_inventory_falls_back_to_uniform_draw() {
        let mut rng = StdRng::seed_from_u64(11);
        let plan = QuotaPlanner::plan(10, &HashMap::new(), &mut rng).unwrap();
        assert_eq!(plan.slots.len(), 10);
    }
}
