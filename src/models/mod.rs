pub mod candidate;
pub mod catalog;
pub mod itinerary;
pub mod location;
pub mod reward;
pub mod slot;
