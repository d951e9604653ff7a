use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::settings::{LogFormat, LogOutput, LogSettings};

/// 로깅 초기화 오류
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("로그 파일 경로가 올바르지 않습니다: {0}")]
    InvalidPath(String),

    #[error("로거 초기화 실패: {0}")]
    Init(String),
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()))
}

/// 전역 tracing 구독자를 설치합니다.
///
/// 반환된 guard가 살아 있는 동안만 로그가 기록됩니다.
pub fn init_logging(settings: &LogSettings) -> Result<WorkerGuard, LoggingError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(settings.level))
        .with_target(true);

    let (writer, guard) = match &settings.output {
        LogOutput::Stdout => {
            tracing_appender::non_blocking(std::io::stdout())
        }
        LogOutput::File(path) => {
            let path = Path::new(path);
            let file_name = path
                .file_name()
                .ok_or_else(|| LoggingError::InvalidPath(path.display().to_string()))?;
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));

            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
        }
    };

    let result = match settings.format {
        LogFormat::Text => builder.with_writer(writer).try_init(),
        LogFormat::Json => builder.json().with_writer(writer).try_init(),
    };

    result.map_err(|e| LoggingError::Init(e.to_string()))?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LogSettings {
            format: LogFormat::Json,
            level: Level::DEBUG,
            output: LogOutput::File(dir.path().join("test.log").display().to_string()),
        };

        let first = init_logging(&settings);
        let second = init_logging(&settings);

        // 다른 테스트가 먼저 설치했을 수 있으므로 두 번째만 확인
        assert!(matches!(second, Err(LoggingError::Init(_))));
        drop(first);
    }
}
