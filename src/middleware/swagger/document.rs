use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use hyper::http::request::Parts;
use hyper::Method;
use jsonschema::{Draft, JSONSchema};
use serde_json::{Map, Value};
use tracing::debug;

use super::validator::{RequestValidator, SchemaError};

const METHODS: [&str; 8] = ["get", "put", "post", "delete", "options", "head", "patch", "trace"];

/// 본문 스키마와 함께 루트에 복사되는 문서 섹션. 로컬 `$ref`는 이 아래를 가리킵니다.
const SCHEMA_SECTIONS: [&str; 2] = ["definitions", "components"];

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("문서 파일 {path} 읽기 실패: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("문서 파싱 실패: {0}")]
    Parse(String),

    #[error("잘못된 문서: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Param,
}

struct BodySchema {
    required: bool,
    schema: JSONSchema,
}

struct Operation {
    method: Method,
    template: String,
    segments: Vec<Segment>,
    required_query: Vec<String>,
    required_headers: Vec<String>,
    body: Option<BodySchema>,
}

impl Operation {
    /// 경로가 템플릿과 일치하면 리터럴 세그먼트 수를 반환합니다.
    fn match_path(&self, segments: &[&str]) -> Option<usize> {
        if self.segments.len() != segments.len() {
            return None;
        }

        let mut literals = 0;
        for (expected, actual) in self.segments.iter().zip(segments) {
            match expected {
                Segment::Literal(literal) if literal == actual => literals += 1,
                Segment::Literal(_) => return None,
                Segment::Param => {}
            }
        }
        Some(literals)
    }
}

/// Swagger 2.0 / OpenAPI 3 문서 기반 요청 검증기
///
/// 다음 순서로 검사합니다.
/// 1. 메서드와 경로 템플릿에 해당하는 operation 존재 여부
/// 2. 필수 query/header 파라미터
/// 3. JSON 본문 존재 여부와 스키마 일치 (Draft 7)
pub struct OpenApiDocument {
    operations: Vec<Operation>,
}

impl OpenApiDocument {
    /// 확장자(.json)에 따라 JSON 또는 YAML 문서를 읽습니다.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let value: Value = if is_json {
            serde_json::from_str(&content).map_err(|e| DocumentError::Parse(e.to_string()))?
        } else {
            serde_yaml::from_str(&content).map_err(|e| DocumentError::Parse(e.to_string()))?
        };

        Self::from_value(value)
    }

    pub fn from_value(doc: Value) -> Result<Self, DocumentError> {
        let paths = doc
            .get("paths")
            .and_then(Value::as_object)
            .ok_or_else(|| DocumentError::Invalid("paths 항목이 없습니다".to_string()))?;

        let base_path = doc
            .get("basePath")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim_end_matches('/');

        let mut operations = Vec::new();
        for (template, item) in paths {
            let item = resolve(item, &doc)?;
            let shared_params = item
                .get("parameters")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();

            for method in METHODS {
                let Some(op) = item.get(method) else {
                    continue;
                };

                let full_template = format!("{}{}", base_path, template);
                let operation = build_operation(method, &full_template, op, &shared_params, &doc)?;
                debug!(method = %operation.method, template = %operation.template, "operation 등록");
                operations.push(operation);
            }
        }

        Ok(Self { operations })
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    fn find_operation(&self, method: &Method, path: &str) -> Result<&Operation, SchemaError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let mut path_found = false;
        let mut best: Option<(usize, &Operation)> = None;
        for operation in &self.operations {
            let Some(literals) = operation.match_path(&segments) else {
                continue;
            };
            path_found = true;
            if operation.method != *method {
                continue;
            }
            if best.map_or(true, |(current, _)| literals > current) {
                best = Some((literals, operation));
            }
        }

        match best {
            Some((_, operation)) => Ok(operation),
            None if path_found => Err(SchemaError::new(format!(
                "method {} is not allowed for path {}",
                method, path
            ))),
            None => Err(SchemaError::new(format!("path {} is not defined", path))),
        }
    }
}

impl RequestValidator for OpenApiDocument {
    fn validate(&self, parts: &Parts, body: &[u8]) -> Result<(), SchemaError> {
        let operation = self.find_operation(&parts.method, parts.uri.path())?;

        if !operation.required_query.is_empty() {
            let query = parts.uri.query().unwrap_or("");
            let present: Vec<String> = url::form_urlencoded::parse(query.as_bytes())
                .map(|(key, _)| key.into_owned())
                .collect();
            for name in &operation.required_query {
                if !present.contains(name) {
                    return Err(SchemaError::new(format!("query parameter {} is required", name)));
                }
            }
        }

        for name in &operation.required_headers {
            if parts.headers.get(name.as_str()).is_none() {
                return Err(SchemaError::new(format!("header {} is required", name)));
            }
        }

        let Some(body_schema) = &operation.body else {
            return Ok(());
        };

        if body.is_empty() {
            return if body_schema.required {
                Err(SchemaError::new("request body is required"))
            } else {
                Ok(())
            };
        }

        let instance: Value = serde_json::from_slice(body)
            .map_err(|e| SchemaError::new(format!("request body is not valid JSON: {}", e)))?;

        if let Err(errors) = body_schema.schema.validate(&instance) {
            let messages: Vec<String> = errors
                .map(|error| {
                    let path = error.instance_path.to_string();
                    if path.is_empty() {
                        error.to_string()
                    } else {
                        format!("{}: {}", path, error)
                    }
                })
                .collect();
            return Err(SchemaError::new(messages.join("; ")));
        }

        Ok(())
    }
}

impl fmt::Debug for OpenApiDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.operations.iter().map(|op| format!("{} {}", op.method, op.template)))
            .finish()
    }
}

fn build_operation(
    method: &str,
    template: &str,
    op: &Value,
    shared_params: &[Value],
    doc: &Value,
) -> Result<Operation, DocumentError> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|e| DocumentError::Invalid(e.to_string()))?;

    let segments = template
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.starts_with('{') && s.ends_with('}') {
                Segment::Param
            } else {
                Segment::Literal(s.to_string())
            }
        })
        .collect();

    let op_params = op.get("parameters").and_then(Value::as_array);
    let mut required_query = Vec::new();
    let mut required_headers = Vec::new();
    let mut body = None;

    for param in shared_params.iter().chain(op_params.into_iter().flatten()) {
        let param = resolve(param, doc)?;
        let required = param.get("required").and_then(Value::as_bool).unwrap_or(false);
        let name = param.get("name").and_then(Value::as_str).unwrap_or_default();

        match param.get("in").and_then(Value::as_str) {
            Some("query") if required => required_query.push(name.to_string()),
            Some("header") if required => required_headers.push(name.to_string()),
            Some("body") => {
                if let Some(schema) = param.get("schema") {
                    body = Some(compile_body(schema, required, doc)?);
                }
            }
            _ => {}
        }
    }

    if let Some(request_body) = op.get("requestBody") {
        let request_body = resolve(request_body, doc)?;
        let required = request_body.get("required").and_then(Value::as_bool).unwrap_or(false);
        if let Some(schema) = request_body.pointer("/content/application~1json/schema") {
            body = Some(compile_body(schema, required, doc)?);
        }
    }

    Ok(Operation {
        method,
        template: template.to_string(),
        segments,
        required_query,
        required_headers,
        body,
    })
}

fn compile_body(schema: &Value, required: bool, doc: &Value) -> Result<BodySchema, DocumentError> {
    check_refs(schema, doc, &mut HashSet::new())?;

    let root = schema_root(schema, doc);
    let schema = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&root)
        .map_err(|e| DocumentError::Invalid(format!("스키마 컴파일 오류: {}", e)))?;

    Ok(BodySchema { required, schema })
}

/// 본문 스키마를 감싸고 문서의 스키마 섹션을 붙인 루트 스키마를 만듭니다.
///
/// `$ref`는 펼치지 않고 그대로 두며, 컴파일러가 루트 기준으로 해석합니다.
fn schema_root(schema: &Value, doc: &Value) -> Value {
    let mut root = Map::new();
    root.insert("allOf".to_string(), Value::Array(vec![schema.clone()]));
    for section in SCHEMA_SECTIONS {
        if let Some(value) = doc.get(section) {
            root.insert(section.to_string(), value.clone());
        }
    }
    Value::Object(root)
}

/// 값이 `$ref`이면 참조 대상을 반환합니다.
fn resolve<'a>(value: &'a Value, doc: &'a Value) -> Result<&'a Value, DocumentError> {
    match value.get("$ref").and_then(Value::as_str) {
        Some(reference) => lookup(reference, doc),
        None => Ok(value),
    }
}

fn lookup<'a>(reference: &str, doc: &'a Value) -> Result<&'a Value, DocumentError> {
    let pointer = reference
        .strip_prefix('#')
        .ok_or_else(|| DocumentError::Invalid(format!("외부 참조는 지원하지 않습니다: {}", reference)))?;

    doc.pointer(pointer)
        .ok_or_else(|| DocumentError::Invalid(format!("참조 대상을 찾을 수 없습니다: {}", reference)))
}

/// 스키마가 가리키는 로컬 `$ref`가 모두 존재하는지 확인합니다.
///
/// 이미 확인한 참조는 다시 따라가지 않으므로 순환 참조에서도 끝납니다.
fn check_refs(value: &Value, doc: &Value, visited: &mut HashSet<String>) -> Result<(), DocumentError> {
    match value {
        Value::Object(map) => {
            if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                let target = lookup(reference, doc)?;
                if !visited.insert(reference.to_string()) {
                    debug!(reference = %reference, "이미 확인한 참조");
                    return Ok(());
                }
                check_refs(target, doc, visited)?;
            }

            for (key, child) in map {
                if key != "$ref" {
                    check_refs(child, doc, visited)?;
                }
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(|item| check_refs(item, doc, visited)),
        _ => Ok(()),
    }
}
