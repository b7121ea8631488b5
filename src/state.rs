use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::students::StudentStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub students: Arc<dyn StudentStore>,
    pub metrics: Arc<Metrics>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn from_parts(
        students: Arc<dyn StudentStore>,
        metrics: Arc<Metrics>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            students,
            metrics,
            config,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::students::repo::memory::MemoryStudentStore;
        Self::fake_with(MemoryStudentStore::new())
    }

    #[cfg(test)]
    pub fn fake_with(store: crate::students::repo::memory::MemoryStudentStore) -> Self {
        let config = AppConfig::from_lookup(|key| (key == "DB_NAME").then(|| "test".to_string()))
            .expect("test config");
        let metrics = Metrics::new().expect("metrics registry");
        Self::from_parts(Arc::new(store), Arc::new(metrics), Arc::new(config))
    }
}
