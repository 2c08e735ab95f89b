//! Shared helpers for service integration tests.
//!
//! Each integration test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use sc_core::config::DatabaseConfig;
use sc_core::error::{LocationError, ScResult};
use sc_models::Database;
use sc_services::event_bus::EventBus;
use sc_services::location::{GeoFix, LocationProvider, PermissionStatus};
use sc_services::message::{ComposeResult, MessageComposer};

/// Create a fresh on-disk database. Keep the TempDir alive for the test's
/// duration or the file disappears under the pool.
pub fn create_test_database() -> (Database, TempDir) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.db");
    let db = Database::init(&path, &DatabaseConfig::default()).unwrap();
    (db, dir)
}

pub fn create_test_event_bus() -> EventBus {
    EventBus::new(16)
}

/// Location provider double with a scripted status, response, and delay.
pub struct ScriptedLocationProvider {
    pub status: PermissionStatus,
    pub response: Result<Option<GeoFix>, LocationError>,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl ScriptedLocationProvider {
    pub fn authorized_fix(latitude: f64, longitude: f64) -> Self {
        Self {
            status: PermissionStatus::Authorized,
            response: Ok(Some(GeoFix {
                latitude,
                longitude,
            })),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_status(status: PermissionStatus) -> Self {
        Self {
            status,
            response: Ok(None),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_response(mut self, response: Result<Option<GeoFix>, LocationError>) -> Self {
        self.response = response;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationProvider for ScriptedLocationProvider {
    fn authorization_status(&self) -> PermissionStatus {
        self.status
    }

    async fn current_location(&self) -> Result<Option<GeoFix>, LocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.response.clone()
    }
}

/// Composer double recording what it was asked to send.
pub struct RecordingComposer {
    pub can_send: bool,
    pub result: ComposeResult,
    pub last_recipients: Mutex<Vec<String>>,
    pub last_body: Mutex<Option<String>>,
}

impl RecordingComposer {
    pub fn sending() -> Self {
        Self {
            can_send: true,
            result: ComposeResult::Sent,
            last_recipients: Mutex::new(Vec::new()),
            last_body: Mutex::new(None),
        }
    }

    pub fn unsendable() -> Self {
        Self {
            can_send: false,
            ..Self::sending()
        }
    }

    pub fn with_result(result: ComposeResult) -> Self {
        Self {
            result,
            ..Self::sending()
        }
    }

    pub fn body(&self) -> Option<String> {
        self.last_body.lock().unwrap().clone()
    }

    pub fn recipients(&self) -> Vec<String> {
        self.last_recipients.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageComposer for RecordingComposer {
    fn can_send_messages(&self) -> bool {
        self.can_send
    }

    async fn compose(&self, recipients: &[String], body: &str) -> ScResult<ComposeResult> {
        *self.last_recipients.lock().unwrap() = recipients.to_vec();
        *self.last_body.lock().unwrap() = Some(body.to_string());
        Ok(self.result)
    }
}
