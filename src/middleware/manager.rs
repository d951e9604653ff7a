use std::collections::HashMap;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::access_log::{AccessLogConfig, AccessLogMiddleware};
use super::authorization::{AuthorizationConfig, AuthorizationMiddleware};
use super::config::MiddlewareType;
use super::cors::{CorsConfig, CorsMiddleware};
use super::swagger::{SwaggerValidatorConfig, SwaggerValidatorMiddleware};
use super::{
    Handler, Middleware, MiddlewareChain, MiddlewareConfig, MiddlewareError, Request, Response,
};

fn settings<T: DeserializeOwned>(config: &MiddlewareConfig) -> Result<T, MiddlewareError> {
    Ok(serde_json::from_value(serde_json::to_value(&config.settings)?)?)
}

/// 미들웨어 설정으로부터 미들웨어 인스턴스를 생성합니다.
fn create_middleware(name: &str, config: &MiddlewareConfig) -> Result<Box<dyn Middleware>, MiddlewareError> {
    debug!(name, middleware_type = ?config.middleware_type, settings = ?config.settings, "미들웨어 생성 시작");

    let middleware: Box<dyn Middleware> = match config.middleware_type {
        MiddlewareType::Authorization => {
            let auth_config: AuthorizationConfig = settings(config)?;
            Box::new(AuthorizationMiddleware::new(auth_config)?)
        }
        MiddlewareType::Cors => {
            let cors_config: CorsConfig = settings(config)?;
            Box::new(CorsMiddleware::new(cors_config)?)
        }
        MiddlewareType::SwaggerValidator => {
            let swagger_config: SwaggerValidatorConfig = settings(config)?;
            Box::new(SwaggerValidatorMiddleware::new(swagger_config)?)
        }
        MiddlewareType::AccessLog => {
            let log_config: AccessLogConfig = settings(config)?;
            Box::new(AccessLogMiddleware::with_tracing(log_config)?)
        }
    };

    Ok(middleware)
}

/// 설정으로 구성한 미들웨어 체인
///
/// 활성화된 미들웨어만 `order` 오름차순(같으면 이름순)으로 실행합니다.
#[derive(Default)]
pub struct MiddlewareManager {
    chain: MiddlewareChain,
}

impl MiddlewareManager {
    /// 미들웨어 하나라도 생성에 실패하면 전체가 실패합니다.
    pub fn new(middleware_configs: &HashMap<String, MiddlewareConfig>) -> Result<Self, MiddlewareError> {
        let mut ordered_configs: Vec<_> = middleware_configs
            .iter()
            .filter(|(_, config)| config.enabled)
            .collect();
        ordered_configs.sort_by(|(a_name, a), (b_name, b)| a.order.cmp(&b.order).then_with(|| a_name.cmp(b_name)));

        let mut chain = MiddlewareChain::new();
        for (name, config) in ordered_configs {
            chain.add_boxed(create_middleware(name, config)?);
        }

        info!(middlewares = ?chain.names(), "미들웨어 체인 구성 완료");
        Ok(Self { chain })
    }

    pub fn chain(&self) -> &MiddlewareChain {
        &self.chain
    }

    pub fn into_chain(self) -> MiddlewareChain {
        self.chain
    }

    pub async fn handle(&self, req: Request, endpoint: &dyn Handler) -> Result<Response, MiddlewareError> {
        self.chain.handle(req, endpoint).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_order_and_enabled() {
        let configs = MiddlewareConfig::from_toml(r#"
            [middlewares.log]
            middleware_type = "access-log"
            order = 0

            [middlewares.cors]
            middleware_type = "cors"
            order = 2

            [middlewares.auth]
            middleware_type = "authorization"
            order = 1
            [middlewares.auth.settings]
            api_key = "secret"

            [middlewares.disabled]
            middleware_type = "cors"
            enabled = false
        "#).unwrap();

        let manager = MiddlewareManager::new(&configs).unwrap();
        assert_eq!(manager.chain().names(), vec!["access-log", "authorization", "cors"]);
    }

    #[test]
    fn test_ties_are_ordered_by_name() {
        let configs = MiddlewareConfig::from_toml(r#"
            [middlewares.b]
            middleware_type = "access-log"

            [middlewares.a]
            middleware_type = "cors"
        "#).unwrap();

        let manager = MiddlewareManager::new(&configs).unwrap();
        assert_eq!(manager.chain().names(), vec!["cors", "access-log"]);
    }

    #[test]
    fn test_invalid_settings_fail() {
        let configs = MiddlewareConfig::from_toml(r#"
            [middlewares.cors]
            middleware_type = "cors"
            [middlewares.cors.settings]
            regex_skip_paths = ["("]
        "#).unwrap();
        assert!(matches!(
            MiddlewareManager::new(&configs),
            Err(MiddlewareError::InvalidPattern { .. })
        ));

        let configs = MiddlewareConfig::from_toml(r#"
            [middlewares.validator]
            middleware_type = "swagger-validator"
            [middlewares.validator.settings]
            document = "/nonexistent/spec.yml"
        "#).unwrap();
        assert!(matches!(
            MiddlewareManager::new(&configs),
            Err(MiddlewareError::Config { .. })
        ));
    }

    #[test]
    fn test_empty_config() {
        let manager = MiddlewareManager::new(&HashMap::new()).unwrap();
        assert!(manager.chain().is_empty());
    }
}
