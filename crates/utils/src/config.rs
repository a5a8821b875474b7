use clap::Parser;

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
#[clap(rename_all = "lowercase")]
pub enum CargoEnv {
    Development,
    Production,
}

/// 环境配置加载器
pub struct EnvLoader;

impl EnvLoader {
    /// 根据 CARGO_ENV 加载对应的环境配置文件
    pub fn load_env_file() -> Result<(), Box<dyn std::error::Error>> {
        // 1. 获取环境变量 CARGO_ENV，默认 development
        let cargo_env = std::env::var("CARGO_ENV").unwrap_or_else(|_| "development".to_string());

        // 2. 构建配置文件路径
        let env_file = match cargo_env.as_str() {
            "production" | "Production" | "prod" => ".env.production",
            "development" | "Development" | "dev" => ".env.development",
            "test" | "Test" => ".env.test",
            _ => {
                eprintln!("⚠️  未知的 CARGO_ENV: {}，使用默认的 .env.development", cargo_env);
                ".env.development"
            }
        };

        // 3. 检查文件是否存在
        if !std::path::Path::new(env_file).exists() {
            if std::path::Path::new(".env").exists() {
                dotenvy::from_filename(".env")?;
                println!("✅ 已加载默认配置文件: .env");
            } else {
                eprintln!("⚠️  未找到 {} 或 .env，使用命令行参数与默认配置", env_file);
            }
            return Ok(());
        }

        // 4. 加载指定的环境配置文件
        dotenvy::from_filename(env_file)?;
        println!("✅ 已加载环境配置文件: {} (CARGO_ENV={})", env_file, cargo_env);

        Ok(())
    }
}

#[derive(clap::Parser, Clone, Debug)]
#[command(name = "referral-hub", about = "Referral rewards administration service")]
pub struct AppConfig {
    #[clap(long, env, value_enum, default_value = "development")]
    pub cargo_env: CargoEnv,

    #[clap(long, env, default_value = "0.0.0.0")]
    pub app_host: String,

    #[clap(long, env, default_value = "8000")]
    pub app_port: u16,

    /// JWT签名密钥
    #[clap(long, env)]
    pub jwt_secret: String,

    /// 访问令牌有效期(小时)
    #[clap(long, env, default_value = "24")]
    pub jwt_expires_in_hours: u64,

    /// 刷新令牌有效期(小时)
    #[clap(long, env, default_value = "168")]
    pub refresh_expires_in_hours: u64,

    /// 重置密码令牌有效期(分钟)
    #[clap(long, env, default_value = "30")]
    pub reset_token_ttl_minutes: u64,

    /// 生成演示数据使用的随机种子
    #[clap(long, env, default_value = "20240101")]
    pub fixture_seed: u64,

    /// 每个完成的推荐奖励的积分
    #[clap(long, env, default_value = "500")]
    pub referral_points: i64,

    #[clap(long, env, default_value = "NGN")]
    pub default_currency: String,

    /// 定时任务 cron 表达式(秒 分 时 日 月 周)
    #[clap(long, env, default_value = "0 */5 * * * *")]
    pub timer_schedule: String,

    #[clap(long, env, default_value = "info")]
    pub rust_log: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        EnvLoader::load_env_file().ok();
        AppConfig::parse()
    }
}

impl AppConfig {
    /// 手动创建配置实例（用于测试）
    pub fn new_for_test() -> Self {
        Self {
            cargo_env: CargoEnv::Development,
            app_host: "127.0.0.1".to_string(),
            app_port: 8765,
            jwt_secret: "test_secret_key_for_jwt_testing_only".to_string(),
            jwt_expires_in_hours: 24,
            refresh_expires_in_hours: 168,
            reset_token_ttl_minutes: 30,
            fixture_seed: 42,
            referral_points: 500,
            default_currency: "NGN".to_string(),
            timer_schedule: "0 */5 * * * *".to_string(),
            rust_log: "debug".to_string(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.cargo_env == CargoEnv::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_from_args() {
        let config = AppConfig::try_parse_from([
            "referral-hub",
            "--jwt-secret",
            "secret",
            "--app-port",
            "9000",
            "--cargo-env",
            "production",
        ])
        .unwrap();

        assert_eq!(config.app_port, 9000);
        assert_eq!(config.jwt_secret, "secret");
        assert!(config.is_production());
        assert_eq!(config.referral_points, 500);
    }

    #[test]
    fn test_config_for_test() {
        let config = AppConfig::new_for_test();
        assert!(!config.is_production());
        assert_eq!(config.default_currency, "NGN");
    }
}
