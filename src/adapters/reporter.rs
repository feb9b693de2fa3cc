use crate::domain::model::{CandidateEvent, RunReport};
use crate::domain::ports::Reporter;
use std::time::Duration;

/// 預設 Reporter：每個完成的候選字與最後統計各寫一筆 tracing 日誌
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl TracingReporter {
    pub fn status_label(event: &CandidateEvent) -> String {
        match (&event.error_detail, event.available) {
            (Some(detail), true) => format!("available! ({})", detail),
            (Some(detail), false) => format!("failed: {}", detail),
            (None, true) => "available!".to_string(),
            (None, false) => "taken".to_string(),
        }
    }
}

impl Reporter for TracingReporter {
    fn run_started(&self, service: &str, total: usize, interval: Duration) {
        tracing::info!(
            service,
            total,
            interval_ms = interval.as_millis() as u64,
            "found {} unchecked words",
            total
        );
    }

    fn candidate_checked(&self, event: &CandidateEvent) {
        let status = Self::status_label(event);
        if event.available {
            tracing::info!(
                word = %event.word,
                index = event.index,
                "{}/{}: {} | {}",
                event.completed,
                event.total,
                event.word,
                status
            );
        } else if event.failed {
            tracing::warn!(
                word = %event.word,
                index = event.index,
                kind = event.error_kind.unwrap_or("unknown"),
                "{}/{}: {} | {}",
                event.completed,
                event.total,
                event.word,
                status
            );
        } else {
            tracing::info!(
                word = %event.word,
                index = event.index,
                "{}/{}: {} | {}",
                event.completed,
                event.total,
                event.word,
                status
            );
        }
    }

    fn run_finished(&self, report: &RunReport) {
        tracing::info!(
            service = %report.service,
            checked = report.total_checked,
            available = report.total_available,
            failed = report.total_failed,
            "done. {} available: [{}]",
            report.total_available,
            report.available_words.join(", ")
        );
    }
}
