pub mod audit_dto;
pub mod auth_dto;
pub mod common;
pub mod dashboard_dto;
pub mod points_dto;
pub mod referral_dto;
pub mod settings_dto;
pub mod staff_dto;
pub mod user_dto;
pub mod withdrawal_dto;
