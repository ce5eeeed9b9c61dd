pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use sqlx::PgPool;

use crate::services::{
    bulk_deactivation_service::BulkDeactivationService,
    pull_request_service::PullRequestService, reviewer_selector::ReviewerSelector,
    stats_service::StatsService, team_service::TeamService, user_service::UserService,
};
use crate::store::{PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub team_service: TeamService,
    pub user_service: UserService,
    pub pull_request_service: PullRequestService,
    pub bulk_deactivation_service: BulkDeactivationService,
    pub stats_service: StatsService,
}

impl AppState {
    pub fn new(pool: PgPool, selector: ReviewerSelector) -> Self {
        Self::from_store(Arc::new(PgStore::new(pool)), selector)
    }

    /// Wires every service to one backend.
    pub fn from_store<S: Store + 'static>(store: Arc<S>, selector: ReviewerSelector) -> Self {
        let team_service = TeamService::new(store.clone());
        let user_service = UserService::new(store.clone());
        let pull_request_service =
            PullRequestService::new(store.clone(), store.clone(), selector.clone());
        let bulk_deactivation_service = BulkDeactivationService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            selector,
        );
        let stats_service = StatsService::new(store);

        Self {
            team_service,
            user_service,
            pull_request_service,
            bulk_deactivation_service,
            stats_service,
        }
    }
}
