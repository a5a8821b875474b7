use anyhow::{Context, Result};
use clap::Parser;
use database::Database;
use server::{app::ApplicationServer, services::Services};
use std::sync::Arc;
use timer::Timer;
use tokio::task::JoinSet;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use utils::{AppConfig, Logger};

#[tokio::main]
async fn main() -> Result<()> {
    let hub = ReferralHub::new().await?;
    hub.run().await
}

pub struct ReferralHub {
    services: Services,
    timer: Timer,
    config: Arc<AppConfig>,
    _log_guard: WorkerGuard,
}

impl ReferralHub {
    pub async fn new() -> Result<Self> {
        let config = ReferralHub::with_config();
        let log_guard = Logger::new(config.cargo_env, &config.rust_log);
        let services = ReferralHub::with_service(config.clone()).await?;
        let timer = Timer::new(Some(config.timer_schedule.clone()), &services);

        Ok(Self {
            services,
            timer,
            config,
            _log_guard: log_guard,
        })
    }

    pub async fn run(self) -> Result<()> {
        let mut set = JoinSet::new();

        // 1. 启动api & services
        // 2. 启动Timer
        let config = self.config.clone();
        let services = self.services.clone();
        set.spawn(async move { ApplicationServer::serve(config, services).await });

        let timer = Arc::new(self.timer);
        set.spawn(async move { timer.run().await.context("🔴 Timer stopped") });

        tokio::select! {
            Some(joined) = set.join_next() => {
                match joined {
                    Ok(Ok(())) => info!("🔔 Task completed, shutting down"),
                    Ok(Err(e)) => error!("🔴 Task failed: {:?}", e),
                    Err(e) => error!("🔴 Task panicked: {}", e),
                }
            },
            _ = ApplicationServer::shutdown_signal() => {
                info!("🔔 Shutdown signal received, stopping all tasks...");
            },
        }

        set.shutdown().await;
        Ok(())
    }
}

impl ReferralHub {
    fn with_config() -> Arc<AppConfig> {
        // 根据 CARGO_ENV 加载对应的环境配置文件
        utils::EnvLoader::load_env_file().ok();
        Arc::new(AppConfig::parse())
    }

    async fn with_service(config: Arc<AppConfig>) -> Result<Services> {
        let database = Database::new(config.clone())
            .await
            .context("🔴 Failed to seed in-memory database")?;

        Ok(Services::new(database, config))
    }
}
