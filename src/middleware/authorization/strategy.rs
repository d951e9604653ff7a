use std::fmt;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use super::config::AuthorizationConfig;

/// 외부에서 주입되는 토큰 검증 함수
///
/// 스킴 접두사(`Bearer `, `Basic `)를 제거한 헤더 값을 받습니다.
pub type AuthValidator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// 헤더 값의 인증 스킴
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Bearer,
    Basic,
}

impl AuthScheme {
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_ascii_lowercase().as_str() {
            "bearer" => Some(Self::Bearer),
            "basic" => Some(Self::Basic),
            _ => None,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Bearer => "Bearer ",
            Self::Basic => "Basic ",
        }
    }

    /// 스킴 접두사가 있으면 제거합니다.
    pub fn strip<'a>(self, value: &'a str) -> &'a str {
        value.strip_prefix(self.prefix()).unwrap_or(value)
    }
}

/// basic 인증 비밀번호
#[derive(Clone, PartialEq, Eq)]
pub enum Password {
    Plain(String),
    /// bcrypt 해시 ($2a$, $2b$, $2y$ 접두사)
    Bcrypt(String),
}

impl Password {
    fn verify(&self, candidate: &str) -> bool {
        match self {
            Self::Plain(expected) => expected == candidate,
            Self::Bcrypt(hash) => bcrypt::verify(candidate, hash).unwrap_or(false),
        }
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Plain(***)"),
            Self::Bcrypt(_) => f.write_str("Bcrypt(***)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub user: String,
    pub password: Password,
}

/// 인증 실패 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    InvalidAuth,
    InvalidMethod,
}

impl AuthFailure {
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidAuth => "invalid authentication",
            Self::InvalidMethod => "invalid authentication method",
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// 인증 전략
///
/// 검증 함수가 주어지면 고정 토큰/자격증명 설정은 무시됩니다.
#[derive(Clone)]
pub enum AuthStrategy {
    Bearer { api_key: String },
    /// 자격증명이 없으면 인증이 비활성화된 것으로 보고 모든 요청을 허용합니다.
    Basic { credentials: Option<BasicCredentials> },
    Custom { scheme: AuthScheme, validator: AuthValidator },
    /// 알 수 없는 인증 방식. 모든 요청을 거부합니다.
    Unsupported(String),
}

impl AuthStrategy {
    pub fn from_config(config: &AuthorizationConfig, validator: Option<AuthValidator>) -> Self {
        let Some(scheme) = AuthScheme::parse(&config.method) else {
            return Self::Unsupported(config.method.clone());
        };

        if let Some(validator) = validator {
            return Self::Custom { scheme, validator };
        }

        match scheme {
            AuthScheme::Bearer => Self::Bearer {
                api_key: config.api_key.clone(),
            },
            AuthScheme::Basic => Self::Basic {
                credentials: config.credentials.as_ref().map(|(user, password)| BasicCredentials {
                    user: user.clone(),
                    password: if config.hashed_password {
                        Password::Bcrypt(password.clone())
                    } else {
                        Password::Plain(password.clone())
                    },
                }),
            },
        }
    }

    /// 헤더 값(접두사 포함)을 검증합니다.
    pub fn verify(&self, header_value: &str) -> Result<(), AuthFailure> {
        match self {
            Self::Bearer { api_key } => {
                let token = AuthScheme::Bearer.strip(header_value);
                if token == api_key.as_str() {
                    Ok(())
                } else {
                    Err(AuthFailure::InvalidAuth)
                }
            }
            Self::Basic { credentials } => {
                let Some(expected) = credentials else {
                    return Ok(());
                };
                let token = AuthScheme::Basic.strip(header_value);
                let (user, password) = decode_basic(token).ok_or(AuthFailure::InvalidAuth)?;
                if expected.user == user && expected.password.verify(&password) {
                    Ok(())
                } else {
                    Err(AuthFailure::InvalidAuth)
                }
            }
            Self::Custom { scheme, validator } => {
                if validator(scheme.strip(header_value)) {
                    Ok(())
                } else {
                    Err(AuthFailure::InvalidAuth)
                }
            }
            Self::Unsupported(_) => Err(AuthFailure::InvalidMethod),
        }
    }

    /// 설정상 모든 요청이 통과하는지 여부
    pub fn is_disabled(&self) -> bool {
        match self {
            Self::Bearer { api_key } => api_key.is_empty(),
            Self::Basic { credentials } => credentials.is_none(),
            _ => false,
        }
    }
}

impl fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer { .. } => f.write_str("Bearer"),
            Self::Basic { credentials } => f
                .debug_struct("Basic")
                .field("credentials", credentials)
                .finish(),
            Self::Custom { scheme, .. } => f.debug_struct("Custom").field("scheme", scheme).finish(),
            Self::Unsupported(method) => f.debug_tuple("Unsupported").field(method).finish(),
        }
    }
}

/// base64로 인코딩된 `user:password`를 디코딩합니다.
fn decode_basic(token: &str) -> Option<(String, String)> {
    let decoded = BASE64.decode(token).ok()?;
    let pair = String::from_utf8(decoded).ok()?;
    let (user, password) = pair.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_header(user: &str, password: &str) -> String {
        format!("Basic {}", BASE64.encode(format!("{}:{}", user, password)))
    }

    #[test]
    fn test_bearer_exact_match() {
        let strategy = AuthStrategy::from_config(&AuthorizationConfig::bearer("123456789"), None);

        assert_eq!(strategy.verify("Bearer 123456789"), Ok(()));
        assert_eq!(strategy.verify("123456789"), Ok(()));
        assert_eq!(strategy.verify("Bearer wrong"), Err(AuthFailure::InvalidAuth));
        // 대소문자/공백 보정 없음
        assert_eq!(strategy.verify("bearer 123456789"), Err(AuthFailure::InvalidAuth));
        assert_eq!(strategy.verify("Bearer 123456789 "), Err(AuthFailure::InvalidAuth));
    }

    #[test]
    fn test_basic_credentials() {
        let strategy = AuthStrategy::from_config(&AuthorizationConfig::basic("user", "pass"), None);

        assert_eq!(strategy.verify(&basic_header("user", "pass")), Ok(()));
        assert_eq!(strategy.verify(&basic_header("user", "nope")), Err(AuthFailure::InvalidAuth));
        assert_eq!(strategy.verify(&basic_header("other", "pass")), Err(AuthFailure::InvalidAuth));
        assert_eq!(strategy.verify("Basic %%%not-base64"), Err(AuthFailure::InvalidAuth));
        // 콜론 없는 페이로드
        assert_eq!(
            strategy.verify(&format!("Basic {}", BASE64.encode("userpass"))),
            Err(AuthFailure::InvalidAuth)
        );
    }

    #[test]
    fn test_basic_password_with_colon() {
        let strategy = AuthStrategy::from_config(&AuthorizationConfig::basic("user", "pa:ss"), None);
        assert_eq!(strategy.verify(&basic_header("user", "pa:ss")), Ok(()));
    }

    #[test]
    fn test_basic_without_credentials_allows_all() {
        let config = AuthorizationConfig {
            method: "basic".to_string(),
            ..Default::default()
        };
        let strategy = AuthStrategy::from_config(&config, None);

        assert!(strategy.is_disabled());
        assert_eq!(strategy.verify(""), Ok(()));
        assert_eq!(strategy.verify("Basic garbage"), Ok(()));
    }

    #[test]
    fn test_bcrypt_password() {
        let hash = bcrypt::hash("secret", 4).unwrap();
        let config = AuthorizationConfig {
            hashed_password: true,
            ..AuthorizationConfig::basic("admin", hash)
        };
        let strategy = AuthStrategy::from_config(&config, None);

        assert_eq!(strategy.verify(&basic_header("admin", "secret")), Ok(()));
        assert_eq!(strategy.verify(&basic_header("admin", "wrong")), Err(AuthFailure::InvalidAuth));
    }

    #[test]
    fn test_validator_overrides_static_values() {
        let validator: AuthValidator = Arc::new(|token: &str| token == "from-validator");
        let strategy = AuthStrategy::from_config(&AuthorizationConfig::bearer("static"), Some(validator));

        assert!(matches!(strategy, AuthStrategy::Custom { scheme: AuthScheme::Bearer, .. }));
        assert_eq!(strategy.verify("Bearer from-validator"), Ok(()));
        assert_eq!(strategy.verify("Bearer static"), Err(AuthFailure::InvalidAuth));
    }

    #[test]
    fn test_validator_receives_stripped_basic_token() {
        let validator: AuthValidator = Arc::new(|token: &str| token == "dXNlcjpwYXNz");
        let config = AuthorizationConfig {
            method: "basic".to_string(),
            ..Default::default()
        };
        let strategy = AuthStrategy::from_config(&config, Some(validator));

        assert_eq!(strategy.verify("Basic dXNlcjpwYXNz"), Ok(()));
        assert!(!strategy.is_disabled());
    }

    #[test]
    fn test_unsupported_method() {
        let config = AuthorizationConfig {
            method: "digest".to_string(),
            ..Default::default()
        };
        let validator: AuthValidator = Arc::new(|_: &str| true);
        let strategy = AuthStrategy::from_config(&config, Some(validator));

        assert_eq!(strategy.verify("anything"), Err(AuthFailure::InvalidMethod));
        assert_eq!(AuthFailure::InvalidMethod.to_string(), "invalid authentication method");
    }
}
