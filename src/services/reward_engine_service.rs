//! Reward Engine
//!
//! Rolls a coupon tier for each itinerary item that maps to an active merchant
//! promotion. Only authenticated users with free inventory capacity receive
//! rewards; a full inventory is a hard cap, never a queue.

use crate::models::itinerary::ItineraryItem;
use crate::models::location::DistrictContext;
use crate::models::reward::{PromotionLookup, RewardRecord, RewardSource, RewardTier};
use crate::services::collaborators::{CollectionStore, PromotionStore};
use crate::services::discovery_config::DiscoveryConfig;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

/// Tier probabilities ordered rarest to most common.
#[derive(Debug, Clone)]
pub struct TierTable {
    entries: Vec<(RewardTier, f64)>,
}

impl TierTable {
    pub fn new(entries: Vec<(RewardTier, f64)>) -> Self {
        let entries = entries
            .into_iter()
            .filter(|(_, p)| p.is_finite() && *p > 0.0)
            .collect();
        Self { entries }
    }

    /// Maps one uniform draw in `[0, 1)` onto a tier with cumulative weights.
    /// Draws past the cumulative total miss.
    pub fn tier_for(&self, draw: f64) -> Option<RewardTier> {
        let mut cumulative = 0.0;
        for (tier, probability) in &self.entries {
            cumulative += probability;
            if draw < cumulative {
                return Some(*tier);
            }
        }
        None
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<RewardTier> {
        self.tier_for(rng.gen::<f64>())
    }
}

/// `now + days`, or `None` when the date is out of range.
fn expiry(now: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>> {
    Duration::try_days(i64::from(days)).and_then(|span| now.checked_add_signed(span))
}

pub struct RewardEngine {
    promotions: Arc<dyn PromotionStore>,
    collections: Arc<dyn CollectionStore>,
    tiers: TierTable,
    max_inventory_slots: usize,
    default_validity_days: u32,
}

impl RewardEngine {
    pub fn new(
        promotions: Arc<dyn PromotionStore>,
        collections: Arc<dyn CollectionStore>,
        config: &DiscoveryConfig,
    ) -> Self {
        Self {
            promotions,
            collections,
            tiers: TierTable::new(config.reward_tiers.clone()),
            max_inventory_slots: config.max_inventory_slots,
            default_validity_days: config.default_reward_validity_days,
        }
    }

    /// Attaches rewards to eligible items. Returns how many records were created.
    pub async fn apply(
        &self,
        items: &mut [ItineraryItem],
        district: &DistrictContext,
        user_id: Option<&str>,
    ) -> usize {
        let Some(user_id) = user_id else {
            return 0;
        };

        let occupied = match self.collections.inventory_count(user_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Inventory unavailable for {}, skipping rewards: {}", user_id, e);
                return 0;
            }
        };
        let mut free = self.max_inventory_slots.saturating_sub(occupied);
        if free == 0 {
            info!("Inventory full for {} ({} slots), no rewards", user_id, occupied);
            return 0;
        }

        let mut granted = 0;
        for item in items.iter_mut() {
            if free == 0 {
                break;
            }

            let lookup = PromotionLookup {
                place_id: item.place_id.as_deref(),
                name: &item.name,
                district: &district.district_name,
                city: &district.region_name,
            };
            let promotion = match self.promotions.active_promotion(&lookup).await {
                Ok(Some(promotion)) => promotion,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Promotion lookup failed for '{}': {}", item.name, e);
                    continue;
                }
            };

            let Some(tier) = self.tiers.roll(&mut rand::thread_rng()) else {
                continue;
            };
            let Some(template) = promotion.templates.get(&tier) else {
                debug!("{} has no {:?} template", promotion.merchant_id, tier);
                continue;
            };

            let now = Utc::now();
            let validity_days = template.validity_days.unwrap_or(self.default_validity_days);
            let valid_until = expiry(now, validity_days)
                .or_else(|| expiry(now, self.default_validity_days))
                .unwrap_or(now);
            let record = RewardRecord {
                id: Uuid::new_v4().to_string(),
                tier,
                source: RewardSource {
                    order: item.order,
                    name: item.name.clone(),
                    place_id: item.place_id.clone(),
                },
                owner_user_id: user_id.to_string(),
                merchant_id: promotion.merchant_id.clone(),
                promotion_id: promotion.promotion_id.clone(),
                title: template.title.clone(),
                valid_until,
                created_at: now,
            };

            match self.collections.insert_reward(&record).await {
                Ok(()) => {
                    info!("Granted {:?} reward for '{}' to {}", tier, item.name, user_id);
                    item.reward_tier = Some(tier);
                    item.reward_record_id = Some(record.id);
                    free -= 1;
                    granted += 1;
                }
                Err(e) => warn!("Failed to store reward for '{}': {}", item.name, e),
            }
        }

        granted
    }
}
