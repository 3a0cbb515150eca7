//! Shared test helpers for workspace crates.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	workspace_root().join("fixtures").join(name)
}

/// Fresh scratch directory removed when the guard drops.
pub fn scratch_dir() -> TempDir {
	tempfile::Builder::new()
		.prefix("tagconf-")
		.tempdir()
		.expect("create scratch directory")
}

/// Install a test-friendly `tracing` subscriber filtered by `RUST_LOG`. Safe to call from every test.
pub fn init_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
}

/// Run `body` under a subscriber that calls `hook` synchronously for every event.
pub fn with_event_hook<R>(hook: impl Fn() + Send + Sync + 'static, body: impl FnOnce() -> R) -> R {
	tracing::subscriber::with_default(tracing_subscriber::registry().with(EventHook(hook)), body)
}

struct EventHook<F>(F);

impl<S: Subscriber, F: Fn() + Send + Sync + 'static> Layer<S> for EventHook<F> {
	fn on_event(&self, _event: &Event<'_>, _ctx: Context<'_, S>) {
		(self.0)();
	}
}
