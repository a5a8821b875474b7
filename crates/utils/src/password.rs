//! 密码哈希（argon2id）

use crate::{AppError, AppResult};
use argon2::{Config, Variant, Version};

/// 密码最小长度
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub struct PasswordHasher;

impl PasswordHasher {
    fn config<'a>() -> Config<'a> {
        let mut config = Config::default();
        config.variant = Variant::Argon2id;
        config.version = Version::Version13;
        config.mem_cost = 4096;
        config.time_cost = 2;
        config
    }

    pub fn hash(password: &str) -> AppResult<String> {
        let salt: [u8; 16] = rand::random();

        argon2::hash_encoded(password.as_bytes(), &salt, &Self::config())
            .map_err(|e| AppError::InternalServerErrorWithContext(format!("Failed to hash password: {}", e)))
    }

    /// 哈希格式错误时视为校验失败
    pub fn verify(password: &str, encoded: &str) -> bool {
        argon2::verify_encoded(encoded, password.as_bytes()).unwrap_or(false)
    }
}
