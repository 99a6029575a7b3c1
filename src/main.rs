use std::io;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::info;

use daytrip_api::db::{
    collection_store::MongoCollectionStore, knowledge_cache::MongoKnowledgeCache,
    location_store::MongoLocationStore, mongo, promotion_store::MongoPromotionStore,
};
use daytrip_api::routes;
use daytrip_api::services::ai_generation_service::AiGenerationService;
use daytrip_api::services::discovery_config::DiscoveryConfig;
use daytrip_api::services::itinerary_generation_service::{Collaborators, ItineraryGenerator};
use daytrip_api::services::place_verification_service::PlaceVerificationService;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);

    let mongo_uri = std::env::var("MONGODB_URI")
        .map_err(|_| io::Error::other("MONGODB_URI must be set"))?;
    let client = mongo::create_mongo_client(&mongo_uri)
        .await
        .map_err(io::Error::other)?;

    let config = DiscoveryConfig::from_env();
    info!("Discovery config: {:?}", config);

    let collaborators = Collaborators {
        locations: Arc::new(MongoLocationStore::new(client.clone())),
        cache: Arc::new(MongoKnowledgeCache::new(client.clone())),
        generator: Arc::new(AiGenerationService::new().map_err(io::Error::other)?),
        verifier: Arc::new(
            PlaceVerificationService::new(config.verification_radius_km)
                .map_err(io::Error::other)?,
        ),
        collections: Arc::new(MongoCollectionStore::new(client.clone())),
        promotions: Arc::new(MongoPromotionStore::new(client)),
    };
    let generator = Arc::new(ItineraryGenerator::with_config(collaborators, config));

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(generator.clone()))
            .route("/health", web::get().to(|| async { "OK" }))
            .service(
                web::scope("/api/itineraries")
                    .route("/discover", web::post().to(routes::discovery::discover)),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
