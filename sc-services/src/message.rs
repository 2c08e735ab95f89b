//! Emergency message composition and the Get Help flow.
//!
//! Builds the outgoing message body from the preferences resolved once per
//! call and the primary partner, appends the location annotation selected
//! by the priority chain, and drives the Idle/Preparing/ComposerPresented
//! state machine around the platform message composer.

use std::time::Duration;

use async_trait::async_trait;
use rusqlite::Connection;
use tracing::{info, warn};

use sc_core::constants::{
    annotations, keys, DEFAULT_CUSTOM_MESSAGE_TEXT, DEFAULT_MESSAGE_TEMPLATE, LOCATION_LEAD_IN,
    MAPS_QUERY_URL, NAME_PLACEHOLDER,
};
use sc_core::error::{LocationError, ScError, ScResult};
use sc_models::{Database, Storage, TrustPartner};

use crate::event_bus::{AppEvent, EventBus};
use crate::location::{LocationService, PermissionStatus};
use crate::partner::PartnerService;
use crate::service::{Service, ServiceState};

/// Message preferences, resolved once per composition call.
///
/// Reading these at composition time (instead of ad hoc mid-flow) means a
/// settings change cannot flip behavior halfway through building a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePreferences {
    /// Use the custom message text instead of the default template.
    pub use_custom_message: bool,
    /// User-editable custom message; may contain the `{NAME}` placeholder.
    pub custom_message_text: String,
    /// Append the current location to the outgoing message.
    pub include_location: bool,
}

impl Default for MessagePreferences {
    fn default() -> Self {
        Self {
            use_custom_message: false,
            custom_message_text: DEFAULT_CUSTOM_MESSAGE_TEXT.to_string(),
            include_location: true,
        }
    }
}

impl MessagePreferences {
    /// Read the three preference entries from storage, applying defaults
    /// for anything unset.
    pub fn resolve(conn: &Connection) -> ScResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            use_custom_message: Storage::get_bool(conn, keys::USE_CUSTOM_MESSAGE)?
                .unwrap_or(defaults.use_custom_message),
            custom_message_text: Storage::get(conn, keys::CUSTOM_MESSAGE_TEXT)?
                .unwrap_or(defaults.custom_message_text),
            include_location: Storage::get_bool(conn, keys::INCLUDE_LOCATION)?
                .unwrap_or(defaults.include_location),
        })
    }
}

/// Result reported by the platform message composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeResult {
    /// The message was handed to the carrier.
    Sent,
    /// The user dismissed the composer without sending.
    Cancelled,
    /// The composer failed to send.
    Failed,
}

impl std::fmt::Display for ComposeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sent => write!(f, "sent"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Platform message-composer collaborator, consumed as a black box.
#[async_trait]
pub trait MessageComposer: Send + Sync {
    /// Whether this device can send text messages at all.
    fn can_send_messages(&self) -> bool;

    /// Present the composer with recipients and body; report the outcome.
    async fn compose(&self, recipients: &[String], body: &str) -> ScResult<ComposeResult>;
}

/// Phases of the Get Help flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetHelpState {
    /// Nothing in progress.
    Idle,
    /// Resolving preferences, filling the template, racing the location fetch.
    Preparing,
    /// The platform composer is on screen.
    ComposerPresented,
}

impl std::fmt::Display for GetHelpState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Preparing => write!(f, "preparing"),
            Self::ComposerPresented => write!(f, "composer presented"),
        }
    }
}

/// Service driving emergency message composition.
pub struct MessageService {
    state: ServiceState,
    flow_state: GetHelpState,
    database: Database,
    event_bus: EventBus,
    location: LocationService,
}

impl MessageService {
    /// Create a new MessageService.
    pub fn new(database: Database, event_bus: EventBus, location: LocationService) -> Self {
        Self {
            state: ServiceState::Created,
            flow_state: GetHelpState::Idle,
            database,
            event_bus,
            location,
        }
    }

    /// Current phase of the Get Help flow.
    pub fn flow_state(&self) -> GetHelpState {
        self.flow_state
    }

    /// The location service used for acquisition (status queries etc).
    pub fn location(&self) -> &LocationService {
        &self.location
    }

    /// Fill the base message for a partner from the resolved preferences.
    ///
    /// A custom message is trimmed first; empty-after-trim falls back to the
    /// default template. `{NAME}` substitution applies in either case.
    pub fn base_message(prefs: &MessagePreferences, partner_name: &str) -> String {
        let template = if prefs.use_custom_message {
            let trimmed = prefs.custom_message_text.trim();
            if trimmed.is_empty() {
                DEFAULT_MESSAGE_TEMPLATE
            } else {
                trimmed
            }
        } else {
            DEFAULT_MESSAGE_TEMPLATE
        };
        template.replace(NAME_PLACEHOLDER, partner_name)
    }

    /// Select the annotation appended to the message.
    ///
    /// Priority chain over (permission status, include-location preference,
    /// acquisition outcome). Location failures never abort composition;
    /// each degrades to its informational sentence.
    async fn location_annotation(&self, prefs: &MessagePreferences, timeout: Duration) -> String {
        let status = self.location.authorization_status();

        if status.is_authorized() && prefs.include_location {
            match self.location.acquire(timeout).await {
                Ok(Some(fix)) => format!("{LOCATION_LEAD_IN}: {}", fix.maps_url()),
                Ok(None) => annotations::NO_FIX.to_string(),
                Err(LocationError::PermissionDenied) => {
                    annotations::DENIED_DURING_FETCH.to_string()
                }
                Err(LocationError::Timeout) => annotations::TIMED_OUT.to_string(),
                Err(other) => format!("(Location services error: {other}.)"),
            }
        } else if !prefs.include_location {
            annotations::SHARING_OFF.to_string()
        } else if matches!(status, PermissionStatus::Denied | PermissionStatus::Restricted) {
            annotations::SERVICES_DISABLED.to_string()
        } else {
            annotations::NOT_DETERMINED.to_string()
        }
    }

    /// Build the complete outgoing body for a partner.
    pub async fn prepare_body(
        &self,
        partner: &TrustPartner,
        prefs: &MessagePreferences,
        timeout: Duration,
    ) -> String {
        let base = Self::base_message(prefs, &partner.name);
        let annotation = self.location_annotation(prefs, timeout).await;
        format!("{base}\n\n{annotation}")
    }

    /// Run the Get Help flow end to end.
    ///
    /// `Idle -> Preparing -> {ComposerPresented | Idle}`: aborts on a
    /// missing primary partner or an unsendable device; otherwise presents
    /// the composer and reports its result. `Preparing` always exits once
    /// the body and the composer decision are computed -- the acquisition
    /// race has a hard timeout, so this never blocks indefinitely.
    pub async fn get_help(
        &mut self,
        partners: &PartnerService,
        composer: &dyn MessageComposer,
        timeout: Duration,
    ) -> ScResult<ComposeResult> {
        let partner = match partners.primary_partner() {
            Some(p) => p.clone(),
            None => {
                warn!("get help requested with no primary partner");
                return Err(ScError::NoPrimaryPartner);
            }
        };

        self.flow_state = GetHelpState::Preparing;
        self.event_bus.emit(AppEvent::HelpRequested {
            partner_id: partner.id,
        });

        let body = match self.prepare(&partner, timeout).await {
            Ok(body) => body,
            Err(e) => {
                self.flow_state = GetHelpState::Idle;
                return Err(e);
            }
        };
        self.event_bus.emit(AppEvent::MessagePrepared {
            includes_location: body.contains(MAPS_QUERY_URL),
        });

        if !composer.can_send_messages() {
            warn!("device cannot send text messages; aborting get help flow");
            self.flow_state = GetHelpState::Idle;
            return Err(ScError::CannotSendMessages);
        }

        self.flow_state = GetHelpState::ComposerPresented;
        let outcome = composer
            .compose(&[partner.phone_number.clone()], &body)
            .await;
        self.flow_state = GetHelpState::Idle;

        let result = outcome?;
        info!("get help flow finished: {result}");
        self.event_bus.emit(AppEvent::ComposeFinished { result });
        Ok(result)
    }

    async fn prepare(&self, partner: &TrustPartner, timeout: Duration) -> ScResult<String> {
        let prefs = {
            let conn = self.database.conn()?;
            MessagePreferences::resolve(&conn)?
        };
        Ok(self.prepare_body(partner, &prefs, timeout).await)
    }
}

impl Service for MessageService {
    fn name(&self) -> &str {
        "message"
    }
    fn state(&self) -> ServiceState {
        self.state
    }
    fn init(&mut self) -> ScResult<()> {
        self.state = ServiceState::Running;
        info!("message service initialized");
        Ok(())
    }
    fn shutdown(&mut self) -> ScResult<()> {
        self.state = ServiceState::Stopped;
        Ok(())
    }
}
