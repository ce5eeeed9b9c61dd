pub mod pull_request_dto;
pub mod stats_dto;
pub mod team_dto;
pub mod user_dto;
