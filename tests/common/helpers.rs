use std::path::Path;
use std::sync::{Arc, Once};
use tempfile::TempDir;

use hoist::cache::MemoryCache;
use hoist::fetcher::FetcherBuilder;

static TRACING: Once = Once::new();

/// Routes engine traces to the test output; filtered via `RUST_LOG`.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates test file content of specified size
pub fn create_test_content(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

/// Quiet fetcher pointed at a scratch directory, with transport-level
/// retries disabled so request counts stay deterministic.
pub fn create_test_fetcher(dir: &Path) -> FetcherBuilder {
    init_tracing();
    FetcherBuilder::hidden()
        .directory(dir.to_path_buf())
        .request_retries(0)
}

/// Same as [`create_test_fetcher`] but wired to a shared in-memory cache.
pub fn create_cached_test_fetcher(dir: &Path, cache: Arc<MemoryCache>) -> FetcherBuilder {
    create_test_fetcher(dir).cache(cache)
}

/// Asserts that a file holds exactly the expected bytes
pub fn assert_file_content(path: &Path, expected: &[u8]) {
    let actual = std::fs::read(path).expect("Failed to read fetched file");
    assert_eq!(
        actual.len(),
        expected.len(),
        "File size mismatch at path: {:?}",
        path
    );
    assert_eq!(actual, expected, "File content mismatch at path: {:?}", path);
}
