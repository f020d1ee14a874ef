pub mod aggregation_service;
pub mod feedback_store;
pub mod webhook_verifier;
