pub mod feedback;
pub mod feedback_summary;
pub mod payment;
