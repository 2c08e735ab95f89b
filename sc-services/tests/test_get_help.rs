//! Integration tests for location acquisition and the Get Help flow.
//!
//! Covers the fetch-vs-timeout race, the permission fast-fail, the request
//! ticket, every branch of the annotation priority chain, and the flow
//! state machine around the composer.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use sc_core::constants::keys;
use sc_core::error::{LocationError, ScError};
use sc_models::{Database, Storage};
use sc_services::event_bus::{AppEvent, EventBus};
use sc_services::location::{LocationService, PermissionStatus};
use sc_services::message::{ComposeResult, GetHelpState, MessageService};
use sc_services::partner::PartnerService;
use sc_services::service::Service;

use common::{RecordingComposer, ScriptedLocationProvider};

const FAST: Duration = Duration::from_millis(50);
const SLOW: Duration = Duration::from_secs(30);

// ---- Acquisition race ----

#[tokio::test]
async fn fetch_wins_race_when_faster_than_timer() {
    let provider = Arc::new(
        ScriptedLocationProvider::authorized_fix(-33.9249, 18.4241)
            .with_delay(Duration::from_millis(10)),
    );
    let svc = LocationService::new(provider.clone());

    let fix = svc.acquire(Duration::from_secs(5)).await.unwrap().unwrap();
    assert_eq!(fix.latitude, -33.9249);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn timer_wins_race_when_fetch_hangs() {
    let provider = Arc::new(ScriptedLocationProvider::authorized_fix(0.0, 0.0).with_delay(SLOW));
    let svc = LocationService::new(provider.clone());

    let started = Instant::now();
    let err = svc.acquire(FAST).await.unwrap_err();
    assert_eq!(err, LocationError::Timeout);
    // The hanging fetch was cancelled, not awaited to completion
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn denied_fails_fast_without_starting_tasks() {
    let provider = Arc::new(ScriptedLocationProvider::with_status(
        PermissionStatus::Denied,
    ));
    let svc = LocationService::new(provider.clone());

    let started = Instant::now();
    let err = svc.acquire(Duration::from_secs(10)).await.unwrap_err();
    assert_eq!(err, LocationError::PermissionDenied);
    assert!(started.elapsed() < Duration::from_millis(100));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn second_concurrent_acquire_is_rejected() {
    let provider = Arc::new(
        ScriptedLocationProvider::authorized_fix(1.0, 2.0)
            .with_delay(Duration::from_millis(200)),
    );
    let svc = Arc::new(LocationService::new(provider));

    let first = {
        let svc = Arc::clone(&svc);
        tokio::spawn(async move { svc.acquire(Duration::from_secs(5)).await })
    };

    // Let the first call take the ticket
    tokio::time::sleep(Duration::from_millis(50)).await;
    let err = svc.acquire(Duration::from_secs(5)).await.unwrap_err();
    assert_eq!(err, LocationError::RequestInFlight);

    // The first call still completes normally
    let fix = first.await.unwrap().unwrap().unwrap();
    assert_eq!(fix.latitude, 1.0);

    // And the ticket is released afterwards
    assert!(svc.acquire(Duration::from_secs(5)).await.is_ok());
}

// ---- Get Help flow ----

struct Flow {
    db: Database,
    bus: EventBus,
    partners: PartnerService,
    messages: MessageService,
    provider: Arc<ScriptedLocationProvider>,
    _dir: tempfile::TempDir,
}

fn build_flow(provider: ScriptedLocationProvider) -> Flow {
    let (db, dir) = common::create_test_database();
    let bus = common::create_test_event_bus();
    let provider = Arc::new(provider);

    let mut partners = PartnerService::new(db.clone(), bus.clone());
    partners.init().unwrap();

    let mut location = LocationService::new(provider.clone());
    location.init().unwrap();

    let mut messages = MessageService::new(db.clone(), bus.clone(), location);
    messages.init().unwrap();

    Flow {
        db,
        bus,
        partners,
        messages,
        provider,
        _dir: dir,
    }
}

impl Flow {
    fn set_pref_bool(&self, key: &str, value: bool) {
        let conn = self.db.conn().unwrap();
        Storage::set_bool(&conn, key, value).unwrap();
    }

    fn set_pref(&self, key: &str, value: &str) {
        let conn = self.db.conn().unwrap();
        Storage::set(&conn, key, value).unwrap();
    }
}

#[tokio::test]
async fn full_flow_embeds_map_link() {
    let mut flow = build_flow(ScriptedLocationProvider::authorized_fix(-33.9249, 18.4241));
    flow.partners.add("Jane", "0721234567").unwrap();

    let composer = RecordingComposer::sending();
    let result = flow
        .messages
        .get_help(&flow.partners, &composer, Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(result, ComposeResult::Sent);
    assert_eq!(flow.messages.flow_state(), GetHelpState::Idle);
    assert_eq!(composer.recipients(), vec!["0721234567".to_string()]);

    let body = composer.body().unwrap();
    assert!(body.starts_with("You are part of my safety circle, Jane."));
    assert!(body.contains(
        "My current location is approximately: https://maps.google.com/?q=-33.9249,18.4241"
    ));
}

#[tokio::test]
async fn flow_annotates_timeout_and_still_sends() {
    let mut flow =
        build_flow(ScriptedLocationProvider::authorized_fix(0.0, 0.0).with_delay(SLOW));
    flow.partners.add("Jane", "0721234567").unwrap();

    let composer = RecordingComposer::sending();
    let started = Instant::now();
    let result = flow
        .messages
        .get_help(&flow.partners, &composer, FAST)
        .await
        .unwrap();

    assert_eq!(result, ComposeResult::Sent);
    assert!(started.elapsed() < Duration::from_secs(5));
    let body = composer.body().unwrap();
    assert!(body.contains("(Could not retrieve location: timed out.)"));
}

#[tokio::test]
async fn flow_annotates_missing_fix() {
    let mut flow = build_flow(
        ScriptedLocationProvider::with_status(PermissionStatus::Authorized)
            .with_response(Ok(None)),
    );
    flow.partners.add("Jane", "0721234567").unwrap();

    let composer = RecordingComposer::sending();
    flow.messages
        .get_help(&flow.partners, &composer, Duration::from_secs(5))
        .await
        .unwrap();

    let body = composer.body().unwrap();
    assert!(body.contains("(Could not retrieve current location details.)"));
}

#[tokio::test]
async fn flow_annotates_provider_error() {
    let mut flow = build_flow(
        ScriptedLocationProvider::with_status(PermissionStatus::Authorized).with_response(Err(
            LocationError::Provider("gps hardware unavailable".into()),
        )),
    );
    flow.partners.add("Jane", "0721234567").unwrap();

    let composer = RecordingComposer::sending();
    flow.messages
        .get_help(&flow.partners, &composer, Duration::from_secs(5))
        .await
        .unwrap();

    let body = composer.body().unwrap();
    assert!(body.contains("(Location services error: gps hardware unavailable.)"));
}

#[tokio::test]
async fn flow_annotates_denied_without_calling_provider() {
    let mut flow = build_flow(ScriptedLocationProvider::with_status(PermissionStatus::Denied));
    flow.partners.add("Jane", "0721234567").unwrap();

    let composer = RecordingComposer::sending();
    flow.messages
        .get_help(&flow.partners, &composer, Duration::from_secs(5))
        .await
        .unwrap();

    let body = composer.body().unwrap();
    assert!(body.contains("(Location services disabled or restricted for this app.)"));
    assert_eq!(flow.provider.call_count(), 0);
}

#[tokio::test]
async fn flow_annotates_not_determined() {
    let mut flow = build_flow(ScriptedLocationProvider::with_status(
        PermissionStatus::NotDetermined,
    ));
    flow.partners.add("Jane", "0721234567").unwrap();

    let composer = RecordingComposer::sending();
    flow.messages
        .get_help(&flow.partners, &composer, Duration::from_secs(5))
        .await
        .unwrap();

    let body = composer.body().unwrap();
    assert!(body
        .contains("(Location permission not yet determined. Please try again or check Settings.)"));
}

#[tokio::test]
async fn flow_respects_sharing_opt_out() {
    // Authorized, but the user turned location sharing off in settings
    let mut flow = build_flow(ScriptedLocationProvider::authorized_fix(1.0, 2.0));
    flow.partners.add("Jane", "0721234567").unwrap();
    flow.set_pref_bool(keys::INCLUDE_LOCATION, false);

    let composer = RecordingComposer::sending();
    flow.messages
        .get_help(&flow.partners, &composer, Duration::from_secs(5))
        .await
        .unwrap();

    let body = composer.body().unwrap();
    assert!(body.contains("(Location sharing turned off by user in settings.)"));
    // Opt-out short-circuits before any acquisition
    assert_eq!(flow.provider.call_count(), 0);
}

#[tokio::test]
async fn flow_uses_custom_message() {
    let mut flow = build_flow(ScriptedLocationProvider::authorized_fix(1.0, 2.0));
    flow.partners.add("Jane", "0721234567").unwrap();
    flow.set_pref_bool(keys::USE_CUSTOM_MESSAGE, true);
    flow.set_pref(keys::CUSTOM_MESSAGE_TEXT, "Call me now, {NAME}!");

    let composer = RecordingComposer::sending();
    flow.messages
        .get_help(&flow.partners, &composer, Duration::from_secs(5))
        .await
        .unwrap();

    let body = composer.body().unwrap();
    assert!(body.starts_with("Call me now, Jane!"));
}

#[tokio::test]
async fn flow_falls_back_when_custom_message_blank() {
    let mut flow = build_flow(ScriptedLocationProvider::authorized_fix(1.0, 2.0));
    flow.partners.add("Jane", "0721234567").unwrap();
    flow.set_pref_bool(keys::USE_CUSTOM_MESSAGE, true);
    flow.set_pref(keys::CUSTOM_MESSAGE_TEXT, "   ");

    let composer = RecordingComposer::sending();
    flow.messages
        .get_help(&flow.partners, &composer, Duration::from_secs(5))
        .await
        .unwrap();

    let body = composer.body().unwrap();
    assert!(body.starts_with("You are part of my safety circle, Jane."));
}

#[tokio::test]
async fn flow_aborts_without_primary_partner() {
    let mut flow = build_flow(ScriptedLocationProvider::authorized_fix(1.0, 2.0));

    let composer = RecordingComposer::sending();
    let err = flow
        .messages
        .get_help(&flow.partners, &composer, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, ScError::NoPrimaryPartner));
    assert_eq!(flow.messages.flow_state(), GetHelpState::Idle);
    assert!(composer.body().is_none());
}

#[tokio::test]
async fn flow_aborts_on_unsendable_device() {
    let mut flow = build_flow(ScriptedLocationProvider::authorized_fix(1.0, 2.0));
    flow.partners.add("Jane", "0721234567").unwrap();

    let composer = RecordingComposer::unsendable();
    let err = flow
        .messages
        .get_help(&flow.partners, &composer, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, ScError::CannotSendMessages));
    assert_eq!(flow.messages.flow_state(), GetHelpState::Idle);
    // The composer was never presented
    assert!(composer.body().is_none());
}

#[tokio::test]
async fn flow_reports_cancelled_result() {
    let mut flow = build_flow(ScriptedLocationProvider::authorized_fix(1.0, 2.0));
    flow.partners.add("Jane", "0721234567").unwrap();

    let composer = RecordingComposer::with_result(ComposeResult::Cancelled);
    let result = flow
        .messages
        .get_help(&flow.partners, &composer, Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(result, ComposeResult::Cancelled);
    assert_eq!(flow.messages.flow_state(), GetHelpState::Idle);
}

#[tokio::test]
async fn flow_emits_events_in_order() {
    let mut flow = build_flow(ScriptedLocationProvider::authorized_fix(1.0, 2.0));
    flow.partners.add("Jane", "0721234567").unwrap();

    let mut rx = flow.bus.subscribe();
    let composer = RecordingComposer::sending();
    flow.messages
        .get_help(&flow.partners, &composer, Duration::from_secs(5))
        .await
        .unwrap();

    assert!(matches!(
        rx.try_recv().unwrap(),
        AppEvent::HelpRequested { .. }
    ));
    match rx.try_recv().unwrap() {
        AppEvent::MessagePrepared { includes_location } => assert!(includes_location),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(matches!(
        rx.try_recv().unwrap(),
        AppEvent::ComposeFinished {
            result: ComposeResult::Sent
        }
    ));
}
