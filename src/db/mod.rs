pub mod collection_store;
pub mod knowledge_cache;
pub mod location_store;
pub mod mongo;
pub mod promotion_store;
