use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::SettingsError;

/// 설정 파일 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    /// 확장자로 형식을 판단합니다.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(Self::Toml),
            "yml" | "yaml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 문자열을 주어진 형식으로 파싱합니다.
pub fn parse_str<T: DeserializeOwned>(content: &str, format: FileFormat) -> Result<T, String> {
    match format {
        FileFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        FileFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        FileFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    }
}

/// 파일을 읽어 확장자에 맞는 형식으로 파싱합니다.
pub fn parse_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, SettingsError> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy().to_string();

    let format = FileFormat::from_path(path)
        .ok_or_else(|| SettingsError::UnsupportedFormat { path: path_str.clone() })?;

    let content = std::fs::read_to_string(path).map_err(|error| SettingsError::FileError {
        path: path_str.clone(),
        error,
    })?;
    debug!(path = %path_str, format = ?format, "설정 파일 읽기");

    parse_str(&content, format).map_err(|reason| SettingsError::ParseError { path: path_str, reason })
}
