// Service exports
pub mod engine;
pub mod profiles;

pub use engine::MatchEngine;
pub use profiles::{InMemoryProfileStore, ProfileProvider};
