use crate::auth::models::{AuthConfig, Claims, PrincipalKind, TokenKind, TOKEN_ISSUER};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

/// 一次登录/刷新签发的访问令牌与刷新令牌
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_jti: String,
    pub refresh_jti: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// 签发令牌所需的主体信息
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub sub: String,
    pub kind: PrincipalKind,
    pub role: String,
    pub permissions: Vec<String>,
}

/// JWT令牌管理器
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: AuthConfig,
}

impl JwtManager {
    /// 创建新的JWT管理器
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_ref());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_ref());

        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    fn encode_claims(
        &self,
        subject: &TokenSubject,
        token_type: TokenKind,
        lifetime: Duration,
    ) -> Result<(String, String, DateTime<Utc>)> {
        let now = Utc::now();
        let expires_at = now + lifetime;
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: subject.sub.clone(),
            kind: subject.kind,
            role: subject.role.clone(),
            permissions: subject.permissions.clone(),
            token_type,
            jti: jti.clone(),
            iat: now.timestamp() as u64,
            exp: expires_at.timestamp() as u64,
            iss: TOKEN_ISSUER.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow!("Failed to generate JWT token: {}", e))?;

        Ok((token, jti, expires_at))
    }

    /// 生成访问令牌 + 刷新令牌
    pub fn generate_token_pair(&self, subject: &TokenSubject) -> Result<TokenPair> {
        let (access_token, access_jti, access_expires_at) = self.encode_claims(
            subject,
            TokenKind::Access,
            Duration::hours(self.config.jwt_expires_in_hours as i64),
        )?;
        let (refresh_token, refresh_jti, refresh_expires_at) = self.encode_claims(
            subject,
            TokenKind::Refresh,
            Duration::hours(self.config.refresh_expires_in_hours as i64),
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_jti,
            refresh_jti,
            access_expires_at,
            refresh_expires_at,
        })
    }

    /// 验证JWT令牌（签名、签发者、过期时间）
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow!("Invalid JWT token: {}", e))?;

        // 检查令牌是否过期
        let now = Utc::now().timestamp() as u64;
        if token_data.claims.exp < now {
            return Err(anyhow!("JWT token has expired"));
        }

        Ok(token_data.claims)
    }

    /// 验证并要求指定的令牌类型
    pub fn verify_token_of(&self, token: &str, expected: TokenKind) -> Result<Claims> {
        let claims = self.verify_token(token)?;
        if claims.token_type != expected {
            return Err(anyhow!("Unexpected token type: {:?}", claims.token_type));
        }
        Ok(claims)
    }
}

/// 将 exp 秒数转换为时间
pub fn expiry_to_datetime(exp: u64) -> DateTime<Utc> {
    Utc.timestamp_opt(exp as i64, 0).single().unwrap_or_else(Utc::now)
}

/// JWT令牌提取器
pub struct TokenExtractor;

impl TokenExtractor {
    /// 从Authorization头部提取Bearer令牌
    pub fn extract_bearer_token(auth_header: Option<&str>) -> Option<String> {
        auth_header
            .and_then(|header| header.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }
}
