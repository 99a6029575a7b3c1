use crate::models::candidate::{Candidate, CandidateOrigin};
use crate::models::catalog::MacroCategory;
use crate::models::location::{Coordinates, DistrictContext, Language};
use crate::models::reward::RewardTier;
use crate::models::slot::TimeSlot;
use serde::{Deserialize, Serialize};

/// Request payload for one itinerary discovery run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRequest {
    pub region_id: Option<i64>,
    pub country_id: Option<i64>,
    pub item_count: usize,
    #[serde(default)]
    pub language: Language,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistrictSummary {
    pub name: String,
    pub region: String,
    pub country: String,
}

impl From<&DistrictContext> for DistrictSummary {
    fn from(district: &DistrictContext) -> Self {
        Self {
            name: district.district_name.clone(),
            region: district.region_name.clone(),
            country: district.country_name.clone(),
        }
    }
}

/// Final output unit. Built after route sequencing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryItem {
    pub order: usize,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    pub category: MacroCategory,
    pub subcategory: String,
    pub time_slot: TimeSlot,
    pub color_tag: String,
    pub verified: bool,
    pub origin: CandidateOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_tier: Option<RewardTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_record_id: Option<String>,
}

impl ItineraryItem {
    pub fn from_candidate(order: usize, candidate: Candidate) -> Self {
        let category = candidate.slot.macro_category;
        Self {
            order,
            name: candidate.name,
            description: candidate.description,
            address: candidate.address,
            coordinates: candidate.coordinates,
            place_id: candidate.place_id,
            rating: candidate.rating,
            category,
            subcategory: candidate.slot.subcategory.unwrap_or_default(),
            time_slot: candidate.slot.time_slot,
            color_tag: category.color_tag().to_string(),
            verified: candidate.verified,
            origin: candidate.origin,
            warning: candidate.warning,
            reward_tier: None,
            reward_record_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryMeta {
    pub requested_count: usize,
    pub returned_count: usize,
    pub cache_hits: usize,
    pub ai_generated: usize,
    pub unverified_count: usize,
    pub rewards_granted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortage_warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    pub district: DistrictSummary,
    pub items: Vec<ItineraryItem>,
    pub meta: DiscoveryMeta,
}
