use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rarity labels, rarest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardTier {
    SP,
    SSR,
    SR,
    S,
    R,
}

impl RewardTier {
    pub const RAREST_FIRST: [RewardTier; 5] = [
        RewardTier::SP,
        RewardTier::SSR,
        RewardTier::SR,
        RewardTier::S,
        RewardTier::R,
    ];
}

/// Coupon template a merchant configured for one tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardTemplate {
    pub title: String,
    pub validity_days: Option<u32>,
}

/// An active promotional overlay on a verified place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    pub merchant_id: String,
    pub promotion_id: String,
    #[serde(default)]
    pub templates: HashMap<RewardTier, RewardTemplate>,
}

/// How an itinerary item is matched to a promotion: place id first,
/// otherwise name + district + city.
#[derive(Debug, Clone)]
pub struct PromotionLookup<'a> {
    pub place_id: Option<&'a str>,
    pub name: &'a str,
    pub district: &'a str,
    pub city: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardSource {
    pub order: usize,
    pub name: String,
    pub place_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardRecord {
    pub id: String,
    pub tier: RewardTier,
    pub source: RewardSource,
    pub owner_user_id: String,
    pub merchant_id: String,
    pub promotion_id: String,
    pub title: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub valid_until: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}
