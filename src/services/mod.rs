pub mod bulk_deactivation_service;
pub mod pull_request_service;
pub mod reviewer_selector;
pub mod stats_service;
pub mod team_service;
pub mod user_service;
