#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
}

/// Progress of a `fetch_all` call. Indices refer to the input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    Started { total: usize },
    Finished { index: usize, title: String, ok: bool },
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: FetchEvent);
}

/// Sink for callers that do not report progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn emit(&self, _event: FetchEvent) {}
}
