use std::{collections::HashMap, env, path::Path};
use serde::Deserialize;
use tracing::{debug, info};
use crate::middleware::config::MiddlewareConfig;

mod error;
pub mod logging;
pub mod parser;
mod server;

pub use error::SettingsError;
pub use logging::{LogFormat, LogOutput, LogSettings};
pub use parser::{parse_file, FileFormat};
pub use server::{parse_env_var, ServerSettings};

pub type Result<T> = std::result::Result<T, SettingsError>;

pub const CONFIG_FILE_ENV: &str = "MIDDLEWARE_CONFIG_FILE";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    // 서버 설정
    #[serde(default)]
    pub server: ServerSettings,

    // 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,

    /// 미들웨어 설정
    #[serde(default)]
    pub middlewares: HashMap<String, MiddlewareConfig>,
}

impl Settings {
    /// `MIDDLEWARE_CONFIG_FILE`이 있으면 파일에서, 없으면 환경 변수에서 설정을 읽습니다.
    pub fn load() -> Result<Self> {
        match env::var(CONFIG_FILE_ENV) {
            Ok(config_path) => Self::from_file(&config_path),
            Err(_) => Self::from_env(),
        }
    }

    /// TOML, YAML, JSON 설정 파일을 읽습니다.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Self = parse_file(&path)?;
        settings.validate()?;

        info!(
            path = %path.as_ref().display(),
            middlewares = settings.middlewares.len(),
            "설정 파일 로드 완료"
        );
        Ok(settings)
    }

    pub fn from_env() -> Result<Self> {
        let settings = Self {
            server: ServerSettings::from_env()?,
            logging: LogSettings::from_env()?,
            middlewares: HashMap::new(),
        };

        settings.validate()?;
        debug!(?settings, "환경 변수 설정 로드 완료");
        Ok(settings)
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<()> {
        self.server.validate()
    }
}
