pub mod bulk_deactivation;
pub mod pull_request;
pub mod statistics;
pub mod team;
pub mod user;
