use crate::models::location::{Coordinates, DistrictContext};
use crate::models::slot::Slot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateOrigin {
    Cache,
    Generated,
    /// Synthetic stand-in emitted when no usable name was produced.
    Placeholder,
}

/// A resolved, possibly-unverified POI proposed for a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub description: String,
    pub address: Option<String>,
    pub place_id: Option<String>,
    pub rating: Option<f32>,
    pub coordinates: Option<Coordinates>,
    pub verified: bool,
    pub origin: CandidateOrigin,
    pub warning: Option<String>,
    pub slot: Slot,
}

impl Candidate {
    pub fn from_cache(entry: CacheEntry, slot: &Slot) -> Self {
        Self {
            name: entry.name,
            description: entry.description,
            address: entry.address,
            place_id: entry.place_id,
            rating: entry.rating,
            coordinates: entry.coordinates,
            verified: true,
            origin: CandidateOrigin::Cache,
            warning: None,
            slot: slot.clone(),
        }
    }

    pub fn verified(generated: GeneratedCandidate, place: VerifiedPlace, slot: &Slot) -> Self {
        Self {
            name: place.name,
            description: generated.description,
            address: place.address,
            place_id: Some(place.place_id),
            rating: place.rating,
            coordinates: Some(place.coordinates),
            verified: true,
            origin: CandidateOrigin::Generated,
            warning: None,
            slot: slot.clone(),
        }
    }

    pub fn unverified(name: String, description: String, warning: String, slot: &Slot) -> Self {
        Self {
            name,
            description,
            address: None,
            place_id: None,
            rating: None,
            coordinates: None,
            verified: false,
            origin: CandidateOrigin::Generated,
            warning: Some(warning),
            slot: slot.clone(),
        }
    }

    pub fn placeholder(district: &DistrictContext, subcategory: &str, warning: String, slot: &Slot) -> Self {
        Self {
            name: format!("{} {}", district.district_name, subcategory),
            description: String::new(),
            address: None,
            place_id: None,
            rating: None,
            coordinates: None,
            verified: false,
            origin: CandidateOrigin::Placeholder,
            warning: Some(warning),
            slot: slot.clone(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.origin == CandidateOrigin::Placeholder
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub subcategory: String,
    pub district: String,
    pub city: String,
    pub country: String,
}

impl CacheKey {
    pub fn new(subcategory: &str, district: &DistrictContext) -> Self {
        Self {
            subcategory: subcategory.to_string(),
            district: district.district_name.clone(),
            city: district.region_name.clone(),
            country: district.country_name.clone(),
        }
    }
}

/// A verified POI persisted in the knowledge cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(flatten)]
    pub key: CacheKey,
    pub name: String,
    pub description: String,
    pub address: Option<String>,
    pub place_id: Option<String>,
    pub rating: Option<f32>,
    pub coordinates: Option<Coordinates>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn from_candidate(key: CacheKey, candidate: &Candidate) -> Self {
        Self {
            key,
            name: candidate.name.clone(),
            description: candidate.description.clone(),
            address: candidate.address.clone(),
            place_id: candidate.place_id.clone(),
            rating: candidate.rating,
            coordinates: candidate.coordinates,
            cached_at: Utc::now(),
        }
    }
}

/// What the place verification service knows about a real place.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedPlace {
    pub place_id: String,
    pub name: String,
    pub address: Option<String>,
    pub rating: Option<f32>,
    pub coordinates: Coordinates,
}

/// Name and description parsed out of an AI completion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratedCandidate {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Templated,
    Unparseable,
    Timeout,
    Unavailable,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Templated => "templated",
            RejectReason::Unparseable => "unparseable",
            RejectReason::Timeout => "timeout",
            RejectReason::Unavailable => "unavailable",
        }
    }
}

/// Tagged result of one AI generation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Candidate(GeneratedCandidate),
    /// The completion was unusable; `proposed` is the name it carried, if any.
    Rejected {
        reason: RejectReason,
        proposed: Option<String>,
    },
}
