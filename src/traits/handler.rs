use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::engine::{CancellationContext, WorkItem};

/// The user-supplied unit of work.
///
/// The engine calls `handle` once per attempt. Implementations should watch
/// `cancel` and return early once it fires. They are not required to, but a
/// handler that ignores it keeps its own resources busy after a timeout or stop.
#[async_trait]
pub trait Handler<T, R>: Send + Sync {
    async fn handle(
        &self,
        item: &WorkItem<T>,
        progress: &ProgressReporter,
        cancel: &CancellationContext,
    ) -> anyhow::Result<R>;

    fn name(&self) -> &'static str {
        "handler"
    }
}

pub(crate) type ProgressSink = Arc<dyn Fn(u64, &serde_json::Value) + Send + Sync>;

/// Progress callback handed to a handler for the duration of one attempt.
#[derive(Clone)]
pub struct ProgressReporter {
    key: u64,
    sink: Option<ProgressSink>,
}

impl ProgressReporter {
    pub(crate) fn new(key: u64, sink: ProgressSink) -> Self {
        Self {
            key,
            sink: Some(sink),
        }
    }

    /// A reporter that drops every report. Useful when calling a handler
    /// directly, outside of a processor.
    pub fn detached(key: u64) -> Self {
        Self { key, sink: None }
    }

    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn report(&self, progress: impl Into<serde_json::Value>) {
        if let Some(sink) = &self.sink {
            sink(self.key, &progress.into());
        }
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("key", &self.key)
            .field("attached", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_report_forwards_key_and_value() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let reporter = ProgressReporter::new(
            7,
            Arc::new(move |key, value| seen_clone.lock().unwrap().push((key, value.clone()))),
        );

        reporter.report(0.5);
        reporter.report(serde_json::json!({"stage": "upload"}));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (7, serde_json::json!(0.5)));
        assert_eq!(seen[1].1["stage"], "upload");
    }

    #[test]
    fn test_detached_reporter_is_silent() {
        let reporter = ProgressReporter::detached(3);
        reporter.report("ignored");
        assert_eq!(reporter.key(), 3);
    }
}
