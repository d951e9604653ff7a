use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use hyper::body::Body as _;
use hyper::header::{self, HeaderMap};
use hyper::{Method, StatusCode, Uri};
use serde::Serialize;

use crate::middleware::{ClientAddr, Request, Response};

pub const HEADER_X_REQUEST_ID: &str = "x-request-id";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// 로그 필드 값
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Str(String),
    Int(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{}", i),
        }
    }
}

/// 하나의 요청에 대한 로그 레코드. 필드 순서에는 의미가 없습니다.
pub type AccessRecord = BTreeMap<String, FieldValue>;

/// 필드 추출 태그
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Id,
    RemoteIp,
    Uri,
    Host,
    Method,
    Path,
    Referer,
    UserAgent,
    Status,
    Latency,
    LatencyHuman,
    BytesIn,
    BytesOut,
    Header(String),
    Query(String),
    Form(String),
    Cookie(String),
    /// 알 수 없는 태그. 항상 값이 없습니다.
    Unknown(String),
}

impl Tag {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "@id" => Self::Id,
            // "@remote"는 이전 설정과의 호환용 별칭
            "@remote_ip" | "@remote" => Self::RemoteIp,
            "@uri" => Self::Uri,
            "@host" => Self::Host,
            "@method" => Self::Method,
            "@path" => Self::Path,
            "@referer" => Self::Referer,
            "@user_agent" => Self::UserAgent,
            "@status" => Self::Status,
            "@latency" => Self::Latency,
            "@latency_human" => Self::LatencyHuman,
            "@bytes_in" => Self::BytesIn,
            "@bytes_out" => Self::BytesOut,
            _ => Self::parse_parameterized(tag).unwrap_or_else(|| Self::Unknown(tag.to_string())),
        }
    }

    fn parse_parameterized(tag: &str) -> Option<Self> {
        let (kind, name) = tag.strip_prefix('@')?.split_once(':')?;
        if name.is_empty() {
            return None;
        }

        let name = name.to_string();
        match kind {
            "header" => Some(Self::Header(name)),
            "query" => Some(Self::Query(name)),
            "form" => Some(Self::Form(name)),
            "cookie" => Some(Self::Cookie(name)),
            _ => None,
        }
    }
}

/// 다음 단계로 요청을 넘기기 전에 보관하는 요청 정보
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    remote_addr: Option<ClientAddr>,
    bytes_in: i64,
    form: Vec<(String, String)>,
}

impl RequestSnapshot {
    /// 요청 정보를 복사합니다. `form_body`는 폼 본문을 미리 읽은 경우에만 전달합니다.
    pub fn capture(req: &Request, form_body: Option<&[u8]>) -> Self {
        let bytes_in = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .or_else(|| req.body().size_hint().exact().map(|n| n as i64))
            .unwrap_or(0);

        let form = form_body
            .filter(|_| is_form(req.headers()))
            .map(|body| {
                url::form_urlencoded::parse(body)
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
            headers: req.headers().clone(),
            remote_addr: req.extensions().get::<ClientAddr>().copied(),
            bytes_in,
            form,
        }
    }

    /// 클라이언트 IP (X-Forwarded-For, X-Real-IP, 연결 주소 순)
    pub fn client_ip(&self) -> Option<String> {
        if let Some(forwarded) = header_str(&self.headers, "x-forwarded-for") {
            if let Some(ip) = forwarded.split(',').next().map(str::trim).filter(|ip| !ip.is_empty()) {
                return Some(ip.to_string());
            }
        }

        if let Some(real_ip) = header_str(&self.headers, "x-real-ip").map(str::trim).filter(|ip| !ip.is_empty()) {
            return Some(real_ip.to_string());
        }

        self.remote_addr.map(|addr| addr.0.ip().to_string())
    }
}

/// 요청이 폼 본문을 가지는지 여부
pub fn is_form(headers: &HeaderMap) -> bool {
    header_str(headers, header::CONTENT_TYPE.as_str())
        .map(|ct| ct.to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

/// 처리가 끝난 요청/응답과 소요 시간
#[derive(Debug)]
pub struct Exchange<'a> {
    pub request: &'a RequestSnapshot,
    pub status: StatusCode,
    pub response_headers: &'a HeaderMap,
    pub bytes_out: i64,
    pub latency: Duration,
}

impl<'a> Exchange<'a> {
    pub fn new(request: &'a RequestSnapshot, response: &'a Response, latency: Duration) -> Self {
        Self {
            request,
            status: response.status(),
            response_headers: response.headers(),
            bytes_out: response.body().size_hint().exact().map(|n| n as i64).unwrap_or(0),
            latency,
        }
    }
}

/// 태그 하나를 값으로 변환합니다. 값이 없거나 빈 문자열이면 `None`입니다.
pub fn resolve(tag: &Tag, ex: &Exchange<'_>) -> Option<FieldValue> {
    let req = ex.request;
    let value = match tag {
        Tag::Id => header_str(&req.headers, HEADER_X_REQUEST_ID)
            .filter(|id| !id.is_empty())
            .or_else(|| header_str(ex.response_headers, HEADER_X_REQUEST_ID))
            .map(str::to_string),
        Tag::RemoteIp => req.client_ip(),
        Tag::Uri => Some(
            req.uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| req.uri.path().to_string()),
        ),
        Tag::Host => header_str(&req.headers, header::HOST.as_str())
            .map(str::to_string)
            .or_else(|| req.uri.authority().map(|a| a.to_string())),
        Tag::Method => Some(req.method.to_string()),
        Tag::Path => {
            let path = match req.uri.query().filter(|q| !q.is_empty()) {
                Some(query) => format!("{}?{}", req.uri.path(), query),
                None => req.uri.path().to_string(),
            };
            Some(if path.is_empty() { "/".to_string() } else { path })
        }
        Tag::Referer => header_str(&req.headers, header::REFERER.as_str()).map(str::to_string),
        Tag::UserAgent => header_str(&req.headers, header::USER_AGENT.as_str()).map(str::to_string),
        Tag::Status => return Some(FieldValue::Int(i64::from(ex.status.as_u16()))),
        Tag::Latency => Some(ex.latency.as_nanos().to_string()),
        Tag::LatencyHuman => Some(format!("{:?}", ex.latency)),
        Tag::BytesIn => return Some(FieldValue::Int(req.bytes_in)),
        Tag::BytesOut => return Some(FieldValue::Int(ex.bytes_out)),
        Tag::Header(name) => header_str(&req.headers, name).map(str::to_string),
        Tag::Query(name) => req.uri.query().and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == name.as_str())
                .map(|(_, value)| value.into_owned())
        }),
        Tag::Form(name) => req
            .form
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone()),
        Tag::Cookie(name) => cookie(&req.headers, name),
        Tag::Unknown(_) => None,
    };

    value.filter(|v| !v.is_empty()).map(FieldValue::Str)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// `Cookie` 헤더에서 이름이 일치하는 첫 값을 찾습니다.
fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}

/// 설정된 필드 매핑을 미리 파싱해 둔 추출기
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    fields: Vec<(String, Tag)>,
}

impl FieldExtractor {
    pub fn new(fields: &HashMap<String, String>) -> Self {
        let fields = fields
            .iter()
            .filter(|(_, tag)| !tag.is_empty())
            .map(|(field, tag)| (field.clone(), Tag::parse(tag)))
            .collect();

        Self { fields }
    }

    /// 폼 태그가 있어 요청 본문을 미리 읽어야 하는지 여부
    pub fn needs_form(&self) -> bool {
        self.fields.iter().any(|(_, tag)| matches!(tag, Tag::Form(_)))
    }

    pub fn extract(&self, ex: &Exchange<'_>) -> AccessRecord {
        self.fields
            .iter()
            .filter_map(|(field, tag)| resolve(tag, ex).map(|value| (field.clone(), value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use std::net::SocketAddr;

    fn snapshot(builder: hyper::http::request::Builder, body: &'static str) -> RequestSnapshot {
        let req = builder.body(Full::new(Bytes::from(body))).unwrap();
        RequestSnapshot::capture(&req, Some(body.as_bytes()))
    }

    fn exchange<'a>(req: &'a RequestSnapshot, headers: &'a HeaderMap) -> Exchange<'a> {
        Exchange {
            request: req,
            status: StatusCode::CREATED,
            response_headers: headers,
            bytes_out: 12,
            latency: Duration::from_micros(1500),
        }
    }

    #[test]
    fn test_parse_tags() {
        let cases = vec![
            ("@id", Tag::Id),
            ("@remote", Tag::RemoteIp),
            ("@remote_ip", Tag::RemoteIp),
            ("@latency_human", Tag::LatencyHuman),
            ("@header:X-Foo", Tag::Header("X-Foo".to_string())),
            ("@query:page", Tag::Query("page".to_string())),
            ("@form:name", Tag::Form("name".to_string())),
            ("@cookie:session", Tag::Cookie("session".to_string())),
            ("@header:", Tag::Unknown("@header:".to_string())),
            ("@body:x", Tag::Unknown("@body:x".to_string())),
            ("status", Tag::Unknown("status".to_string())),
        ];

        for (input, expected) in cases {
            assert_eq!(Tag::parse(input), expected, "태그: '{}'", input);
        }
    }

    #[test]
    fn test_builtin_values() {
        let req = snapshot(
            hyper::Request::builder()
                .method("POST")
                .uri("/items?page=2")
                .header("host", "api.example.com")
                .header("referer", "https://example.com/")
                .header("user-agent", "curl/8.0")
                .header("x-request-id", "req-1"),
            "hello",
        );
        let headers = HeaderMap::new();
        let ex = exchange(&req, &headers);

        let str_value = |tag: &str| resolve(&Tag::parse(tag), &ex).map(|v| v.to_string());

        assert_eq!(str_value("@id").as_deref(), Some("req-1"));
        assert_eq!(str_value("@uri").as_deref(), Some("/items?page=2"));
        assert_eq!(str_value("@path").as_deref(), Some("/items?page=2"));
        assert_eq!(str_value("@host").as_deref(), Some("api.example.com"));
        assert_eq!(str_value("@method").as_deref(), Some("POST"));
        assert_eq!(str_value("@referer").as_deref(), Some("https://example.com/"));
        assert_eq!(str_value("@user_agent").as_deref(), Some("curl/8.0"));
        assert_eq!(str_value("@latency").as_deref(), Some("1500000"));
        assert_eq!(str_value("@latency_human").as_deref(), Some("1.5ms"));

        assert_eq!(resolve(&Tag::Status, &ex), Some(FieldValue::Int(201)));
        assert_eq!(resolve(&Tag::BytesIn, &ex), Some(FieldValue::Int(5)));
        assert_eq!(resolve(&Tag::BytesOut, &ex), Some(FieldValue::Int(12)));
    }

    #[test]
    fn test_absent_values() {
        let req = snapshot(hyper::Request::builder().uri("/"), "");
        let headers = HeaderMap::new();
        let ex = exchange(&req, &headers);

        for tag in ["@id", "@remote_ip", "@referer", "@header:X-Foo", "@query:q", "@form:f", "@cookie:c", "@nope"] {
            assert_eq!(resolve(&Tag::parse(tag), &ex), None, "태그: '{}'", tag);
        }
    }

    #[test]
    fn test_request_id_falls_back_to_response() {
        let req = snapshot(hyper::Request::builder().uri("/"), "");
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", "generated".parse().unwrap());
        let ex = exchange(&req, &headers);

        assert_eq!(resolve(&Tag::Id, &ex), Some(FieldValue::Str("generated".to_string())));
    }

    #[test]
    fn test_parameterized_values() {
        let req = snapshot(
            hyper::Request::builder()
                .method("POST")
                .uri("/login?next=%2Fhome&empty=")
                .header("x-foo", "bar")
                .header("cookie", "theme=dark; session=abc123")
                .header("content-type", "application/x-www-form-urlencoded; charset=utf-8"),
            "user=kim&note=hello+world",
        );
        let headers = HeaderMap::new();
        let ex = exchange(&req, &headers);

        let value = |tag: &str| resolve(&Tag::parse(tag), &ex);

        assert_eq!(value("@header:X-Foo"), Some(FieldValue::Str("bar".to_string())));
        assert_eq!(value("@query:next"), Some(FieldValue::Str("/home".to_string())));
        assert_eq!(value("@query:empty"), None);
        assert_eq!(value("@form:user"), Some(FieldValue::Str("kim".to_string())));
        assert_eq!(value("@form:note"), Some(FieldValue::Str("hello world".to_string())));
        assert_eq!(value("@cookie:session"), Some(FieldValue::Str("abc123".to_string())));
        assert_eq!(value("@cookie:missing"), None);
    }

    #[test]
    fn test_form_ignored_without_form_content_type() {
        let req = snapshot(
            hyper::Request::builder().method("POST").uri("/").header("content-type", "application/json"),
            "user=kim",
        );
        let headers = HeaderMap::new();
        assert_eq!(resolve(&Tag::parse("@form:user"), &exchange(&req, &headers)), None);
    }

    #[test]
    fn test_client_ip_order() {
        let addr: SocketAddr = "10.0.0.9:5000".parse().unwrap();

        let mut req = hyper::Request::builder()
            .uri("/")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "198.51.100.2")
            .body(Full::new(Bytes::new()))
            .unwrap();
        req.extensions_mut().insert(ClientAddr(addr));
        assert_eq!(RequestSnapshot::capture(&req, None).client_ip().as_deref(), Some("203.0.113.7"));

        req.headers_mut().remove("x-forwarded-for");
        assert_eq!(RequestSnapshot::capture(&req, None).client_ip().as_deref(), Some("198.51.100.2"));

        req.headers_mut().remove("x-real-ip");
        assert_eq!(RequestSnapshot::capture(&req, None).client_ip().as_deref(), Some("10.0.0.9"));
    }

    #[test]
    fn test_extract_skips_absent_fields() {
        let fields: HashMap<String, String> = [
            ("foo", "@header:X-Foo"),
            ("method", "@method"),
            ("bogus", "@bogus"),
            ("blank", ""),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let extractor = FieldExtractor::new(&fields);
        assert!(!extractor.needs_form());

        let req = snapshot(hyper::Request::builder().uri("/"), "");
        let headers = HeaderMap::new();
        let ex = exchange(&req, &headers);

        let record = extractor.extract(&ex);
        assert_eq!(record.len(), 1);
        assert_eq!(record["method"], FieldValue::Str("GET".to_string()));

        // 같은 입력은 같은 결과
        assert_eq!(extractor.extract(&ex), record);
    }
}
