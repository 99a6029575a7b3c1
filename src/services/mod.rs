pub mod ai_generation_service;
pub mod backfill_service;
pub mod cache_store_service;
pub mod candidate_resolver_service;
pub mod collaborators;
pub mod dedup_service;
pub mod discovery_config;
pub mod itinerary_generation_service;
pub mod place_verification_service;
pub mod quota_planner_service;
pub mod retry;
pub mod reward_engine_service;
pub mod route_sequencer_service;
pub mod worker_dispatcher_service;
