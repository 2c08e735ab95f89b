//! Location acquisition with a bounded two-task race.
//!
//! Wraps the platform's single-shot location request behind an async call
//! and races it against a timer. The loser is cancelled by drop. Only one
//! request may be outstanding at a time; concurrent callers are rejected by
//! the request ticket rather than silently overwriting a shared
//! continuation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use sc_core::constants::MAPS_QUERY_URL;
use sc_core::error::{LocationError, ScResult};

use crate::service::{Service, ServiceState};

/// Authorization state reported by the platform location provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// The user has never been asked.
    NotDetermined,
    /// Location is blocked device-wide (e.g. parental controls).
    Restricted,
    /// The user declined location access for this app.
    Denied,
    /// Location access is granted.
    Authorized,
}

impl PermissionStatus {
    /// Whether acquisition may proceed.
    pub fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }
}

impl std::fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotDetermined => write!(f, "not determined"),
            Self::Restricted => write!(f, "restricted"),
            Self::Denied => write!(f, "denied"),
            Self::Authorized => write!(f, "authorized"),
        }
    }
}

/// A single location fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoFix {
    /// Map link embedded in outgoing messages.
    pub fn maps_url(&self) -> String {
        format!("{MAPS_QUERY_URL}{},{}", self.latitude, self.longitude)
    }
}

/// Platform location collaborator, consumed as a black box.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Current authorization status.
    fn authorization_status(&self) -> PermissionStatus;

    /// Ask the platform to prompt the user for permission. Only meaningful
    /// when the status is not determined; the default does nothing.
    fn request_permission(&self) {}

    /// Single-shot location request. Resolves with a fix, `None` when the
    /// platform has no fix to offer, or a provider error.
    async fn current_location(&self) -> Result<Option<GeoFix>, LocationError>;
}

/// Produces at most one location fix per call, with a bounded wait.
pub struct LocationService {
    state: ServiceState,
    provider: Arc<dyn LocationProvider>,
    in_flight: Arc<AtomicBool>,
}

impl LocationService {
    /// Create a new LocationService over a platform provider.
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        Self {
            state: ServiceState::Created,
            provider,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current authorization status of the underlying provider.
    pub fn authorization_status(&self) -> PermissionStatus {
        self.provider.authorization_status()
    }

    /// Forward a permission request to the provider.
    pub fn request_permission(&self) {
        self.provider.request_permission()
    }

    /// Acquire a single fix, waiting at most `timeout`.
    ///
    /// Fails fast with `PermissionDenied` when the provider is not
    /// authorized, without starting either task. Otherwise the provider's
    /// single-shot request races the timer; whichever loses is cancelled by
    /// drop. A second call while one is pending is rejected with
    /// `RequestInFlight`.
    pub async fn acquire(&self, timeout: Duration) -> Result<Option<GeoFix>, LocationError> {
        if !self.provider.authorization_status().is_authorized() {
            debug!("location request refused: permission not granted");
            return Err(LocationError::PermissionDenied);
        }

        let _ticket = RequestTicket::take(&self.in_flight)?;

        tokio::select! {
            outcome = self.provider.current_location() => {
                match &outcome {
                    Ok(Some(fix)) => debug!("location fix obtained: {},{}", fix.latitude, fix.longitude),
                    Ok(None) => debug!("location provider resolved without a fix"),
                    Err(e) => warn!("location request failed: {e}"),
                }
                outcome
            }
            _ = tokio::time::sleep(timeout) => {
                debug!("location request timed out after {timeout:?}");
                Err(LocationError::Timeout)
            }
        }
    }
}

impl Service for LocationService {
    fn name(&self) -> &str {
        "location"
    }
    fn state(&self) -> ServiceState {
        self.state
    }
    fn init(&mut self) -> ScResult<()> {
        self.state = ServiceState::Running;
        info!("location service initialized");
        Ok(())
    }
    fn shutdown(&mut self) -> ScResult<()> {
        self.state = ServiceState::Stopped;
        Ok(())
    }
}

/// Guard marking one outstanding acquisition; cleared on drop.
#[derive(Debug)]
struct RequestTicket {
    flag: Arc<AtomicBool>,
}

impl RequestTicket {
    fn take(flag: &Arc<AtomicBool>) -> Result<Self, LocationError> {
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LocationError::RequestInFlight);
        }
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for RequestTicket {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
