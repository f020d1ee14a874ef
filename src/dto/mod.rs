pub mod feedback_dto;
pub mod webhook_dto;
