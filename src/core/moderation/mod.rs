// Core moderation module - contains the decision pipeline business logic.

pub mod moderation_models;
pub mod moderation_service;

pub use moderation_models::*;
pub use moderation_service::*;
