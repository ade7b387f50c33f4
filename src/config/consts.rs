/// Default number of concurrent workers
pub const DEFAULT_CONCURRENCY: usize = 1;
/// Default sleep between pulls when a streaming source is temporarily empty
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;
/// Default `tracing` filter directive for the binary
pub const DEFAULT_LOG_LEVEL: &str = "info";
