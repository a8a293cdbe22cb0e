//! Testing utilities for the geofence engine workspace
//!
//! Shared fakes: in-memory data store, hand-driven position stream,
//! recording notification sink, static auth context.

#![allow(missing_docs)]

use async_trait::async_trait;
use dashmap::DashMap;
use hyperapp_geofence::{
    AuthContext, NotificationPriority, NotificationSink, PositionError, PositionService,
    PositionUpdate, SubscribeOptions, UserId, WatchHandle,
};
use hyperapp_zones::{DataStore, QueryFilter, SortOrder, StoreError};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// In-memory [`DataStore`] with per-table failure injection.
#[derive(Default)]
pub struct InMemoryStore {
    tables: DashMap<String, Vec<Value>>,
    failing_reads: Mutex<HashSet<String>>,
    failing_writes: Mutex<HashSet<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a table.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables.entry(table.to_string()).or_default().extend(rows);
    }

    /// Make every query on `table` fail.
    pub fn fail_reads_on(&self, table: &str) {
        self.failing_reads.lock().insert(table.to_string());
    }

    /// Make every insert/upsert on `table` fail.
    pub fn fail_writes_on(&self, table: &str) {
        self.failing_writes.lock().insert(table.to_string());
    }

    /// Snapshot of a table's rows.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .get(table)
            .map(|rows| rows.clone())
            .unwrap_or_default()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map(|rows| rows.len()).unwrap_or(0)
    }
}

fn matches_filter(row: &Value, filter: &QueryFilter) -> bool {
    filter.eq.iter().all(|(column, value)| row.get(column) == Some(value))
        && filter
            .not_null
            .iter()
            .all(|column| matches!(row.get(column), Some(v) if !v.is_null()))
}

fn sort_key(row: &Value, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => format!("{:030.6}", n.as_f64().unwrap_or(0.0)),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn query(&self, table: &str, filter: QueryFilter) -> Result<Vec<Value>, StoreError> {
        if self.failing_reads.lock().contains(table) {
            return Err(StoreError::QueryFailed {
                table: table.to_string(),
                message: "injected read failure".to_string(),
            });
        }

        let mut rows: Vec<Value> = self
            .rows(table)
            .into_iter()
            .filter(|row| matches_filter(row, &filter))
            .collect();

        if let Some((column, order)) = &filter.order_by {
            rows.sort_by_key(|row| sort_key(row, column));
            if *order == SortOrder::Desc {
                rows.reverse();
            }
        }
        if let Some(limit) = filter.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn insert(&self, table: &str, record: Value) -> Result<Value, StoreError> {
        if self.failing_writes.lock().contains(table) {
            return Err(StoreError::WriteFailed {
                table: table.to_string(),
                message: "injected write failure".to_string(),
            });
        }
        self.tables
            .entry(table.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn upsert(&self, table: &str, record: Value) -> Result<(), StoreError> {
        if self.failing_writes.lock().contains(table) {
            return Err(StoreError::WriteFailed {
                table: table.to_string(),
                message: "injected write failure".to_string(),
            });
        }

        // Keyed by `id`, falling back to `user_id` for settings rows.
        let key = if record.get("id").is_some() { "id" } else { "user_id" };
        let mut rows = self.tables.entry(table.to_string()).or_default();
        match rows.iter_mut().find(|row| row.get(key) == record.get(key)) {
            Some(existing) => *existing = record,
            None => rows.push(record),
        }
        Ok(())
    }
}

/// Hand-driven [`PositionService`]: tests push updates one at a time.
pub struct ManualPositions {
    sender: Mutex<Option<mpsc::Sender<PositionUpdate>>>,
    next_handle: AtomicU64,
    unsubscribed: Mutex<Vec<WatchHandle>>,
    deny_permission: AtomicBool,
}

impl ManualPositions {
    pub fn new() -> Self {
        Self {
            sender: Mutex::new(None),
            next_handle: AtomicU64::new(1),
            unsubscribed: Mutex::new(Vec::new()),
            deny_permission: AtomicBool::new(false),
        }
    }

    /// Make the next subscribe call fail with `PermissionDenied`.
    pub fn deny_permission(&self) {
        self.deny_permission.store(true, Ordering::SeqCst);
    }

    /// Push one update into the live subscription.
    pub async fn send(&self, update: PositionUpdate) {
        let sender = self.sender.lock().clone();
        let sender = sender.expect("no live subscription");
        sender.send(update).await.expect("subscription dropped");
    }

    /// Close the stream (platform watch ended).
    pub fn close(&self) {
        self.sender.lock().take();
    }

    pub fn has_subscriber(&self) -> bool {
        self.sender.lock().is_some()
    }

    pub fn unsubscribed_handles(&self) -> Vec<WatchHandle> {
        self.unsubscribed.lock().clone()
    }
}

impl Default for ManualPositions {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PositionService for ManualPositions {
    async fn subscribe(
        &self,
        _options: SubscribeOptions,
    ) -> Result<(WatchHandle, mpsc::Receiver<PositionUpdate>), PositionError> {
        if self.deny_permission.swap(false, Ordering::SeqCst) {
            return Err(PositionError::PermissionDenied);
        }
        let (tx, rx) = mpsc::channel(32);
        *self.sender.lock() = Some(tx);
        let handle = WatchHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        Ok((handle, rx))
    }

    async fn unsubscribe(&self, handle: WatchHandle) {
        self.unsubscribed.lock().push(handle);
        self.sender.lock().take();
    }
}

/// Recording [`NotificationSink`].
#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<(String, NotificationPriority)>>,
    haptics: Mutex<Vec<Vec<u64>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<(String, NotificationPriority)> {
        self.notifications.lock().clone()
    }

    pub fn notification_count(&self) -> usize {
        self.notifications.lock().len()
    }

    pub fn haptic_count(&self) -> usize {
        self.haptics.lock().len()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, message: &str, priority: NotificationPriority) {
        self.notifications
            .lock()
            .push((message.to_string(), priority));
    }

    fn haptic(&self, pattern: &[u64]) {
        self.haptics.lock().push(pattern.to_vec());
    }
}

/// Fixed [`AuthContext`].
pub struct StaticAuth {
    user: Option<UserId>,
}

impl StaticAuth {
    pub fn signed_in(user: UserId) -> Self {
        Self { user: Some(user) }
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

impl AuthContext for StaticAuth {
    fn current_user_id(&self) -> Option<UserId> {
        self.user
    }
}

/// Install a tracing subscriber that writes to the test harness output.
/// Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Poll `condition` until it holds or ~2 s elapse. Returns whether it held.
/// Used to assert on fire-and-forget persistence without fixed sleeps.
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Convenience: a store/notifier/positions triple shared by most tests.
/// Also installs the test tracing subscriber.
pub fn fresh_collaborators() -> (Arc<InMemoryStore>, Arc<RecordingNotifier>, Arc<ManualPositions>) {
    init_test_tracing();
    (
        Arc::new(InMemoryStore::new()),
        Arc::new(RecordingNotifier::new()),
        Arc::new(ManualPositions::new()),
    )
}
