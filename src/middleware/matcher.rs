use std::collections::HashSet;
use regex_lite as regex;
use super::MiddlewareError;

/// 미들웨어 적용을 건너뛸 경로 판별기
///
/// 정적 경로 집합과 정규식 목록 중 하나라도 일치하면 예외 경로입니다.
/// 정규식은 생성 시점에 한 번만 컴파일됩니다.
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    paths: HashSet<String>,
    patterns: Vec<regex::Regex>,
}

impl PathMatcher {
    pub fn new<S: AsRef<str>>(paths: &[S], patterns: &[S]) -> Result<Self, MiddlewareError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                regex::Regex::new(pattern).map_err(|e| MiddlewareError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            paths: paths.iter().map(|p| p.as_ref().to_string()).collect(),
            patterns,
        })
    }

    pub fn is_exempt(&self, path: &str) -> bool {
        self.paths.contains(path) || self.patterns.iter().any(|re| re.is_match(path))
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.patterns.is_empty()
    }
}
