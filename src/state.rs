use crate::config::AppConfig;
use crate::db::Db;
use crate::services::notifications::NotificationRelay;
use crate::services::pricing::SurgePolicy;
use crate::services::routing::RouteEstimator;

pub struct AppState {
    pub db: Db,
    pub config: AppConfig,
    pub routes: RouteEstimator,
    pub surge: SurgePolicy,
    pub notifier: Box<dyn NotificationRelay>,
}
