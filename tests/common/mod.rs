//! Common test utilities for propbind integration tests

#![allow(dead_code)]

use propbind::PropertiesFileSource;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// A scratch properties file on disk, rewritable between reload cycles.
pub struct PropsFixture {
    // Held so the directory outlives the fixture
    dir: TempDir,
    pub path: PathBuf,
}

/// Enable log output for a test run (`RUST_LOG=debug cargo test -- --nocapture`)
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

impl PropsFixture {
    pub fn new(contents: &str) -> Self {
        init_logging();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.properties");
        std::fs::write(&path, contents).unwrap();
        Self { dir, path }
    }

    pub fn rewrite(&self, contents: &str) {
        std::fs::write(&self.path, contents).unwrap();
    }

    pub fn delete(&self) {
        std::fs::remove_file(&self.path).unwrap();
    }

    pub fn source(&self) -> PropertiesFileSource {
        PropertiesFileSource::new(&self.path)
    }
}

/// Poll a predicate until it holds or the timeout elapses.
pub fn wait_until(timeout: Duration, predicate: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    predicate()
}
