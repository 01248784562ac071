use actix_web::web;
use sqlx::PgPool;

use crate::analysis::{AnalysisJobs, GeminiClient};
use crate::auth::rate_limit::RateLimiter;
use crate::config::AppConfig;
use crate::errors::AppError;

/// Everything handlers extract with `web::Data`, built once and shared by all workers.
#[derive(Clone)]
pub struct AppServices {
    pub pool: PgPool,
    pub config: web::Data<AppConfig>,
    pub limiter: web::Data<RateLimiter>,
    pub jobs: web::Data<AnalysisJobs>,
    pub gemini: web::Data<GeminiClient>,
}

impl AppServices {
    pub fn new(pool: PgPool, config: AppConfig) -> Result<Self, AppError> {
        let limiter = RateLimiter::new(config.login_max_attempts, config.login_window);
        let gemini = GeminiClient::new(config.gemini.clone())?;
        Ok(Self {
            pool,
            config: web::Data::new(config),
            limiter: web::Data::new(limiter),
            jobs: web::Data::new(AnalysisJobs::new()),
            gemini: web::Data::new(gemini),
        })
    }

    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.pool.clone()))
            .app_data(self.config.clone())
            .app_data(self.limiter.clone())
            .app_data(self.jobs.clone())
            .app_data(self.gemini.clone());
    }
}
