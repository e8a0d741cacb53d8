use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
    gateway::RazorpayGateway,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: AppConfig,
    pub gateway: Option<RazorpayGateway>,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn, config: AppConfig) -> Self {
        let gateway = config
            .gateway_credentials()
            .map(|(key_id, key_secret)| RazorpayGateway::new(key_id, key_secret));
        Self {
            pool,
            orm,
            config,
            gateway,
        }
    }
}
