use std::sync::Arc;

use crate::config::Settings;
use crate::probe::{ConnectionParameters, Connector, PgConnector, Prober, RetryPolicy};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub prober: Arc<Prober>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let params = ConnectionParameters::from_config(&settings.db);
        let policy = RetryPolicy::from_config(&settings.probe);
        let connector = Arc::new(PgConnector::new(params));

        Self::with_connector(settings, connector, policy)
    }

    /// Build state around an injected connector. Used by tests to probe
    /// against stub backends.
    pub fn with_connector(
        settings: Settings,
        connector: Arc<dyn Connector>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            prober: Arc::new(Prober::new(connector, policy)),
        }
    }
}
