use serde::Deserialize;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use super::SettingsError;

pub const HOST_ENV: &str = "MIDDLEWARE_HOST";
pub const HTTP_PORT_ENV: &str = "MIDDLEWARE_HTTP_PORT";

/// 리스너 설정
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ServerSettings {
    /// 바인딩 주소 (기본값: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// HTTP 포트 (기본값: 8080)
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

fn default_host() -> IpAddr { IpAddr::V4(Ipv4Addr::UNSPECIFIED) }
fn default_http_port() -> u16 { 8080 }

/// 환경 변수를 읽어 파싱합니다. 없으면 `default` 값을 사용합니다.
pub fn parse_env_var<T: std::str::FromStr, F: FnOnce() -> T>(name: &str, default: F) -> Result<T, SettingsError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: val,
            reason: e.to_string(),
        }),
        Err(env::VarError::NotPresent) => Ok(default()),
        Err(e) => Err(SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: "".to_string(),
            reason: e.to_string(),
        }),
    }
}

fn invalid_port(var_name: &str, port: u16) -> SettingsError {
    SettingsError::EnvVarInvalid {
        var_name: var_name.to_string(),
        value: port.to_string(),
        reason: "포트는 0이 될 수 없습니다".to_string(),
    }
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let settings = Self {
            host: parse_env_var(HOST_ENV, default_host)?,
            http_port: parse_env_var(HTTP_PORT_ENV, default_http_port)?,
        };

        if settings.http_port == 0 {
            return Err(invalid_port(HTTP_PORT_ENV, settings.http_port));
        }
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        match self.http_port {
            0 => Err(invalid_port("server.http_port", self.http_port)),
            _ => Ok(()),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.http_port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_port_is_invalid() {
        let settings = ServerSettings { http_port: 0, ..Default::default() };
        assert!(matches!(settings.validate(), Err(SettingsError::EnvVarInvalid { .. })));
    }

    #[test]
    fn test_addr() {
        let settings: ServerSettings = toml::from_str(r#"
            host = "127.0.0.1"
            http_port = 9100
        "#).unwrap();
        assert_eq!(settings.addr().to_string(), "127.0.0.1:9100");
    }
}
