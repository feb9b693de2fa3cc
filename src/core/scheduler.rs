use crate::core::candidates::CandidateBatch;
use crate::core::classifier::classify;
use crate::core::request::build_request;
use crate::domain::model::{CandidateEvent, CheckOutcome, RunReport, ServiceDescriptor};
use crate::domain::ports::{Reporter, RequestExecutor, ResultSink};
use crate::utils::error::CandidateError;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};

/// 失敗的候選字（傳輸、模板、判斷錯誤）是否要寫入 checked 紀錄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// 視為「已檢查、不可用」，之後不會再檢查
    #[default]
    RecordAsChecked,
    /// 不寫入紀錄，下次執行會重新檢查
    LeaveUnchecked,
}

/// 依固定間隔發出候選字檢查，每個候選字獨立執行 Build → Execute → Classify → Record
pub struct Scheduler<E, S, R>
where
    E: RequestExecutor + 'static,
    S: ResultSink + 'static,
    R: Reporter,
{
    descriptor: Arc<ServiceDescriptor>,
    executor: Arc<E>,
    sink: Arc<S>,
    reporter: R,
    policy: FailurePolicy,
}

impl<E, S, R> Scheduler<E, S, R>
where
    E: RequestExecutor + 'static,
    S: ResultSink + 'static,
    R: Reporter,
{
    pub fn new(descriptor: Arc<ServiceDescriptor>, executor: Arc<E>, sink: Arc<S>, reporter: R) -> Self {
        Self {
            descriptor,
            executor,
            sink,
            reporter,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// 執行到全部 N 個候選字完成為止，沒有取消機制
    pub async fn run(&self, batch: CandidateBatch) -> RunReport {
        let started_at = chrono::Utc::now();
        let start = Instant::now();
        let total = batch.len();

        tracing::info!(
            "🚀 {}: checking {} words every {:?}",
            self.descriptor.name,
            total,
            batch.interval
        );
        self.reporter
            .run_started(&self.descriptor.name, total, batch.interval);

        let mut tasks = JoinSet::new();
        for (index, word) in batch.words.into_iter().enumerate() {
            let fire_at = start + batch.interval * index as u32;
            let descriptor = Arc::clone(&self.descriptor);
            let executor = Arc::clone(&self.executor);
            let sink = Arc::clone(&self.sink);
            let policy = self.policy;

            tasks.spawn(async move {
                sleep_until(fire_at).await;
                tracing::debug!("📡 dispatching #{} '{}'", index, word);

                // 在獨立 task 中執行，panic 也只會變成這個候選字的失敗
                let pipeline_word = word.clone();
                let pipeline = tokio::spawn(async move {
                    check_candidate(
                        &descriptor,
                        executor.as_ref(),
                        sink.as_ref(),
                        policy,
                        index,
                        pipeline_word,
                    )
                    .await
                });

                match pipeline.await {
                    Ok(outcome) => outcome,
                    Err(e) => CheckOutcome {
                        index,
                        word,
                        response: None,
                        available: false,
                        failed: true,
                        error: Some(CandidateError::Aborted {
                            message: e.to_string(),
                        }),
                    },
                }
            });
        }

        // 只有這個迴圈會更新計數與結果，完成順序不一定等於發送順序
        let mut completed = 0usize;
        let mut failed = 0usize;
        let mut available_words = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            completed += 1;

            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    failed += 1;
                    tracing::error!("❌ candidate task failed to complete: {}", e);
                    continue;
                }
            };

            if outcome.failed {
                failed += 1;
                if let Some(error) = &outcome.error {
                    tracing::warn!("⚠️ '{}' failed ({}): {}", outcome.word, error.kind(), error);
                }
            }
            if outcome.available {
                available_words.push(outcome.word.clone());
            }

            self.reporter
                .candidate_checked(&CandidateEvent::from_outcome(&outcome, completed, total));
        }

        let report = RunReport {
            service: self.descriptor.name.clone(),
            started_at,
            elapsed: start.elapsed(),
            total_checked: completed,
            total_failed: failed,
            total_available: available_words.len(),
            available_words,
        };

        tracing::info!(
            "✅ {}: done, {} checked, {} available, {} failed",
            report.service,
            report.total_checked,
            report.total_available,
            report.total_failed
        );
        self.reporter.run_finished(&report);

        report
    }
}

/// 單一候選字的完整流程。每個步驟的錯誤都收斂成 outcome，不會往外傳
pub async fn check_candidate<E, S>(
    descriptor: &ServiceDescriptor,
    executor: &E,
    sink: &S,
    policy: FailurePolicy,
    index: usize,
    word: String,
) -> CheckOutcome
where
    E: RequestExecutor,
    S: ResultSink,
{
    let mut response = None;

    let verdict: Result<bool, CandidateError> = match build_request(descriptor, &word) {
        Err(e) => Err(e.into()),
        Ok(request) => match executor.execute(&request).await {
            None => Err(CandidateError::Transport {
                url: request.url.clone(),
            }),
            Some(resp) => {
                let verdict = classify(descriptor, &resp).map_err(CandidateError::from);
                response = Some(resp);
                verdict
            }
        },
    };

    let available = matches!(verdict, Ok(true));
    let mut error = verdict.err();

    let should_record = error.is_none() || policy == FailurePolicy::RecordAsChecked;
    if should_record {
        if let Err(e) = sink.record(&descriptor.name, &word, available).await {
            tracing::error!("❌ failed to record '{}' for {}: {}", word, descriptor.name, e);
            // 分類結果仍保留在記憶體中的統計
            error.get_or_insert(CandidateError::Persistence {
                message: e.to_string(),
            });
        }
    }

    CheckOutcome {
        index,
        word,
        response,
        available,
        failed: error.is_some(),
        error,
    }
}
