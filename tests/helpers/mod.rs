//! Shared mock collaborators for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tocadiscos::error::{Error, Result};
use tocadiscos::notify::Notifier;
use tocadiscos::resolve::MediaResolver;
use tocadiscos::sink::{AudioSink, CompletionCallback, SinkConnector, VoiceTarget};
use tocadiscos::track::Track;
use tocadiscos::{GroupId, OrchestratorConfig, SessionManager};

/// Build a track with a predictable stream URI.
pub fn track(title: &str) -> Track {
    Track::new(title, "uploader", 120, format!("https://stream.test/{title}"))
}

/// Resolver backed by a fixed query -> track table; unknown queries fail
/// with `ResolutionFailed`.
#[derive(Default)]
pub struct MockResolver {
    tracks: Mutex<HashMap<String, Track>>,
}

impl MockResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(&self, query: &str, track: Track) {
        self.tracks.lock().unwrap().insert(query.to_string(), track);
    }
}

#[async_trait]
impl MediaResolver for MockResolver {
    async fn resolve(&self, query: &str) -> Result<Track> {
        self.tracks
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .ok_or_else(|| Error::ResolutionFailed(format!("no stream for '{query}'")))
    }
}

/// In-memory sink that records every streamed URI and lets tests finish the
/// active stream on demand.
#[derive(Default)]
pub struct MockSink {
    connected: AtomicBool,
    streaming: AtomicBool,
    target: Mutex<Option<VoiceTarget>>,
    on_complete: Mutex<Option<CompletionCallback>>,
    played: Mutex<Vec<String>>,
    fail_uris: Mutex<Vec<String>>,
    fail_moves: AtomicBool,
    stop_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
}

impl MockSink {
    pub fn new(target: VoiceTarget) -> Arc<Self> {
        let sink = Self::default();
        sink.connected.store(true, Ordering::SeqCst);
        *sink.target.lock().unwrap() = Some(target);
        Arc::new(sink)
    }

    /// Make `stream` fail for this URI.
    pub fn fail_streams_for(&self, uri: &str) {
        self.fail_uris.lock().unwrap().push(uri.to_string());
    }

    /// Make every `move_to` fail from now on.
    pub fn fail_moves(&self) {
        self.fail_moves.store(true, Ordering::SeqCst);
    }

    /// Simulate the active stream finishing on its own.
    pub fn complete_current(&self, error: Option<Error>) {
        let callback = self.on_complete.lock().unwrap().take();
        self.streaming.store(false, Ordering::SeqCst);
        if let Some(callback) = callback {
            callback(error);
        }
    }

    /// Every URI handed to `stream`, in order.
    pub fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioSink for MockSink {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::SeqCst)
    }

    fn target(&self) -> Option<VoiceTarget> {
        *self.target.lock().unwrap()
    }

    async fn stream(&self, uri: &str, on_complete: CompletionCallback) -> Result<()> {
        if self.fail_uris.lock().unwrap().iter().any(|u| u == uri) {
            return Err(Error::Sink(format!("cannot open {uri}")));
        }
        self.played.lock().unwrap().push(uri.to_string());
        self.streaming.store(true, Ordering::SeqCst);
        *self.on_complete.lock().unwrap() = Some(on_complete);
        Ok(())
    }

    async fn stop(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.complete_current(None);
    }

    async fn disconnect(&self) {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
        self.streaming.store(false, Ordering::SeqCst);
    }

    async fn move_to(&self, target: VoiceTarget) -> Result<()> {
        if self.fail_moves.load(Ordering::SeqCst) {
            return Err(Error::Sink("cannot move connection".into()));
        }
        *self.target.lock().unwrap() = Some(target);
        Ok(())
    }
}

/// Connector that mints a fresh `MockSink` per connect and remembers them.
#[derive(Default)]
pub struct MockConnector {
    sinks: Mutex<Vec<Arc<MockSink>>>,
    refusing: AtomicBool,
}

impl MockConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn last_sink(&self) -> Option<Arc<MockSink>> {
        self.sinks.lock().unwrap().last().cloned()
    }

    pub fn connect_count(&self) -> usize {
        self.sinks.lock().unwrap().len()
    }

    /// Make `connect` fail until turned off again.
    pub fn refuse_connections(&self, refusing: bool) {
        self.refusing.store(refusing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SinkConnector for MockConnector {
    async fn connect(&self, _group_id: GroupId, target: VoiceTarget) -> Result<Arc<dyn AudioSink>> {
        if self.refusing.load(Ordering::SeqCst) {
            return Err(Error::Sink("voice connection refused".into()));
        }
        let sink = MockSink::new(target);
        self.sinks.lock().unwrap().push(sink.clone());
        Ok(sink)
    }
}

/// Notifier that records every post. Posts matching a gate are parked until
/// the gate is released, which lets tests widen race windows around a
/// notification.
#[derive(Default)]
pub struct MockNotifier {
    posts: Mutex<Vec<(GroupId, String)>>,
    gate: Mutex<Option<(String, Arc<Semaphore>)>>,
    held: AtomicUsize,
}

impl MockNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Park every post containing `needle` until the returned gate is
    /// released.
    pub fn hold_posts_containing(&self, needle: &str) -> PostGate {
        let sem = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some((needle.to_string(), sem.clone()));
        PostGate { sem }
    }

    /// Posts currently parked on the gate.
    pub fn held_posts(&self) -> usize {
        self.held.load(Ordering::SeqCst)
    }

    pub fn posts(&self) -> Vec<(GroupId, String)> {
        self.posts.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn post(&self, group_id: GroupId, text: &str) {
        let gate = {
            let gate = self.gate.lock().unwrap();
            gate.as_ref()
                .filter(|(needle, _)| text.contains(needle))
                .map(|(_, sem)| sem.clone())
        };
        if let Some(sem) = gate {
            self.held.fetch_add(1, Ordering::SeqCst);
            // The semaphore starts with no permits; closing it on release
            // wakes every parked post (and lets later ones straight through).
            let _ = sem.acquire().await;
            self.held.fetch_sub(1, Ordering::SeqCst);
        }
        self.posts.lock().unwrap().push((group_id, text.to_string()));
    }
}

/// Handle for releasing posts parked by [`MockNotifier::hold_posts_containing`].
pub struct PostGate {
    sem: Arc<Semaphore>,
}

impl PostGate {
    pub fn release(&self) {
        self.sem.close();
    }
}

/// Everything a test needs: the manager plus handles to all the mocks.
pub struct Harness {
    pub manager: Arc<SessionManager>,
    pub resolver: Arc<MockResolver>,
    pub connector: Arc<MockConnector>,
    pub notifier: Arc<MockNotifier>,
}

/// Config with short delays so watchdog tests run in milliseconds.
pub fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        idle_delay_ms: 50,
        ambient_ceiling_ms: 200,
        ambient_dir: None,
        queue_display_limit: 10,
    }
}

pub fn harness(config: OrchestratorConfig) -> Harness {
    // RUST_LOG=debug shows orchestrator tracing during test runs
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let resolver = MockResolver::new();
    let connector = MockConnector::new();
    let notifier = MockNotifier::new();
    let manager = SessionManager::new(
        config,
        resolver.clone(),
        connector.clone(),
        notifier.clone(),
    );
    Harness {
        manager,
        resolver,
        connector,
        notifier,
    }
}

/// Poll `condition` until it holds or `limit` elapses.
pub async fn wait_until(condition: impl Fn() -> bool, limit: Duration, what: &str) {
    let deadline = tokio::time::Instant::now() + limit;
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
