use std::io::Write;
use std::sync::Mutex;

use tracing::{info, warn};

use super::extractor::AccessRecord;

/// 접근 로그 레코드를 받는 출력 대상
pub trait AccessLogSink: Send + Sync {
    fn emit(&self, record: &AccessRecord);
}

/// `access_log` 타겟의 tracing 이벤트로 레코드를 내보냅니다.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AccessLogSink for TracingSink {
    fn emit(&self, record: &AccessRecord) {
        match serde_json::to_string(record) {
            Ok(fields) => info!(target: "access_log", fields = %fields, "request"),
            Err(e) => warn!(target: "access_log", error = %e, "접근 로그 직렬화 실패"),
        }
    }
}

/// 레코드를 한 줄짜리 JSON으로 기록하는 출력 대상
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> AccessLogSink for WriterSink<W> {
    fn emit(&self, record: &AccessRecord) {
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Err(e) = write_line(&mut *writer, record) {
            warn!(error = %e, "접근 로그 기록 실패");
        }
    }
}

fn write_line<W: Write>(writer: &mut W, record: &AccessRecord) -> std::io::Result<()> {
    serde_json::to_writer(&mut *writer, record)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// 테스트 등에서 레코드를 메모리에 모아 두는 출력 대상
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<AccessRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AccessRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AccessLogSink for MemorySink {
    fn emit(&self, record: &AccessRecord) {
        match self.records.lock() {
            Ok(mut records) => records.push(record.clone()),
            Err(poisoned) => poisoned.into_inner().push(record.clone()),
        }
    }
}
