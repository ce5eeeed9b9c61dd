use std::sync::Arc;

use crate::error::Result;
use crate::models::statistics::Statistics;
use crate::store::StatsStore;

#[derive(Clone)]
pub struct StatsService {
    stats: Arc<dyn StatsStore>,
}

impl StatsService {
    pub fn new(stats: Arc<dyn StatsStore>) -> Self {
        Self { stats }
    }

    pub async fn statistics(&self) -> Result<Statistics> {
        self.stats.statistics().await
    }
}
