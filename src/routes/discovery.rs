use crate::error::DiscoveryError;
use crate::models::itinerary::DiscoveryRequest;
use crate::services::itinerary_generation_service::ItineraryGenerator;
use actix_web::{web, HttpResponse, Responder};
use log::error;
use serde_json::json;
use std::sync::Arc;

/*
    /api/itineraries/discover
*/
pub async fn discover(
    generator: web::Data<Arc<ItineraryGenerator>>,
    request: web::Json<DiscoveryRequest>,
) -> impl Responder {
    match generator.generate_itinerary(&request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(err) => error_response(&err),
    }
}

fn error_response(err: &DiscoveryError) -> HttpResponse {
    let body = json!({ "error": err.to_string() });
    match err {
        DiscoveryError::Configuration(_) => HttpResponse::BadRequest().json(body),
        DiscoveryError::NoDistrictFound { .. } => HttpResponse::NotFound().json(body),
        DiscoveryError::Store(e) => {
            error!("Location store failed while resolving district: {}", e);
            HttpResponse::ServiceUnavailable().json(body)
        }
    }
}
