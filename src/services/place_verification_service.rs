//! Place Verification
//!
//! Confirms that an AI-proposed name is a real, locatable place near the
//! target district, using the Google Places Text Search API.
//!
//! ## Setup
//! Set `GOOGLE_MAPS_API_KEY` with the Places API (New) enabled.

use crate::error::ServiceError;
use crate::models::candidate::VerifiedPlace;
use crate::models::location::{Coordinates, DistrictContext};
use crate::services::collaborators::PlaceVerifier;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use std::time::Duration;

const SEARCH_TEXT_URL: &str = "https://places.googleapis.com/v1/places:searchText";
const FIELD_MASK: &str =
    "places.id,places.displayName,places.formattedAddress,places.location,places.rating";
const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchTextRequest {
    text_query: String,
    max_result_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    location_bias: Option<LocationBias>,
}

#[derive(Debug, Serialize)]
struct LocationBias {
    circle: Circle,
}

#[derive(Debug, Serialize)]
struct Circle {
    center: LatLng,
    radius: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct SearchTextResponse {
    #[serde(default)]
    places: Vec<Place>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Place {
    id: String,
    display_name: Option<LocalizedText>,
    formatted_address: Option<String>,
    location: Option<LatLng>,
    rating: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct LocalizedText {
    text: String,
}

pub struct PlaceVerificationService {
    http_client: Client,
    api_key: String,
    bias_radius_m: f64,
}

impl PlaceVerificationService {
    pub fn new(bias_radius_km: f64) -> Result<Self, ServiceError> {
        let api_key = env::var("GOOGLE_MAPS_API_KEY").map_err(|_| {
            ServiceError::Environment("GOOGLE_MAPS_API_KEY environment variable not set".to_string())
        })?;

        let http_client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            http_client,
            api_key,
            bias_radius_m: bias_radius_km * 1000.0,
        })
    }
}

#[async_trait]
impl PlaceVerifier for PlaceVerificationService {
    async fn find_place(
        &self,
        query: &str,
        district: &DistrictContext,
    ) -> Result<Option<VerifiedPlace>, ServiceError> {
        let request = SearchTextRequest {
            text_query: format!("{} {}", query, district.display_path()),
            max_result_count: 1,
            location_bias: district.centroid.map(|c| LocationBias {
                circle: Circle {
                    center: LatLng {
                        latitude: c.lat,
                        longitude: c.lng,
                    },
                    radius: self.bias_radius_m,
                },
            }),
        };

        let response = self
            .http_client
            .post(SEARCH_TEXT_URL)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ServiceError::Response(format!(
                "Places search failed with status {}: {}",
                status, error_text
            )));
        }

        let body: SearchTextResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Response(format!("Failed to parse response: {}", e)))?;

        Ok(body.places.into_iter().find_map(|place| {
            let location = place.location?;
            Some(VerifiedPlace {
                name: place
                    .display_name
                    .map(|n| n.text)
                    .unwrap_or_else(|| query.to_string()),
                place_id: place.id,
                address: place.formatted_address,
                rating: place.rating,
                coordinates: Coordinates::new(location.latitude, location.longitude),
            })
        }))
    }
}

/// Result of passing one proposed name through the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Matched(VerifiedPlace),
    NotFound,
    OutOfRange { distance_km: f64 },
    Timeout,
    Failed(String),
}

/// Wraps a [`PlaceVerifier`] with a per-call timeout and the radius check
/// against the district centroid.
#[derive(Clone)]
pub struct VerificationGate {
    verifier: Arc<dyn PlaceVerifier>,
    radius_km: f64,
    timeout: Duration,
}

impl VerificationGate {
    pub fn new(verifier: Arc<dyn PlaceVerifier>, radius_km: f64, timeout: Duration) -> Self {
        Self {
            verifier,
            radius_km,
            timeout,
        }
    }

    pub async fn verify(&self, name: &str, district: &DistrictContext) -> Verification {
        let lookup = self.verifier.find_place(name, district);
        let place = match tokio::time::timeout(self.timeout, lookup).await {
            Err(_) => {
                warn!("Verification of '{}' timed out after {:?}", name, self.timeout);
                return Verification::Timeout;
            }
            Ok(Err(e)) => {
                warn!("Verification of '{}' failed: {}", name, e);
                return Verification::Failed(e.to_string());
            }
            Ok(Ok(None)) => return Verification::NotFound,
            Ok(Ok(Some(place))) => place,
        };

        if let Some(centroid) = district.centroid {
            let distance_km = haversine_km(centroid, place.coordinates);
            if distance_km > self.radius_km {
                debug!(
                    "'{}' matched '{}' {:.1} km from {} (limit {:.1} km)",
                    name, place.name, distance_km, district.district_name, self.radius_km
                );
                return Verification::OutOfRange { distance_km };
            }
        }

        Verification::Matched(place)
    }
}

/// Great-circle distance using the Haversine formula
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
