use crate::domain::model::{CandidateEvent, ConcreteRequest, HttpResponse, RunReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;

/// 發出實際的 HTTP 請求。傳輸層錯誤一律收斂成 `None`，不往外丟錯
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: &ConcreteRequest) -> Option<HttpResponse>;
}

/// 每個服務兩個 append-only 紀錄：checked 與 available
pub trait ResultSink: Send + Sync {
    /// 已檢查過的字；紀錄不存在時視為空集合
    fn checked_words(
        &self,
        service: &str,
    ) -> impl std::future::Future<Output = Result<HashSet<String>>> + Send;

    fn record(
        &self,
        service: &str,
        word: &str,
        available: bool,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait Reporter: Send + Sync {
    fn run_started(&self, _service: &str, _total: usize, _interval: Duration) {}
    fn candidate_checked(&self, event: &CandidateEvent);
    fn run_finished(&self, report: &RunReport);
}
