//! Global error types for the SafeCircle application.
//!
//! All error categories across the application are unified into a single
//! `ScError` enum with conversions from underlying library errors. The
//! partner-validation and location error enums live alongside it because
//! their messages are shown to the user verbatim.

use thiserror::Error;

/// Convenience type alias for Results using ScError.
pub type ScResult<T> = Result<T, ScError>;

/// Unified error type covering all error categories in SafeCircle.
#[derive(Error, Debug)]
pub enum ScError {
    // -- Configuration errors --
    /// Failed to load or parse application configuration.
    #[error("configuration error: {0}")]
    Config(String),

    // -- Database errors --
    /// SQLite database error.
    #[error("database error: {0}")]
    Database(String),

    /// Database migration failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Database connection pool error.
    #[error("connection pool error: {0}")]
    Pool(String),

    /// Database integrity check failed.
    #[error("database integrity check failed: {0}")]
    IntegrityCheck(String),

    // -- Partner store errors --
    /// Adding a trust partner failed validation.
    #[error(transparent)]
    AddPartner(#[from] AddPartnerError),

    /// No partner with the given id exists in the store.
    #[error("no trust partner found with id {0}")]
    PartnerNotFound(String),

    // -- Get Help flow errors --
    /// The flow was triggered without a primary partner selected.
    #[error("no primary trust partner is selected")]
    NoPrimaryPartner,

    /// The device reports it cannot send text messages.
    #[error("this device cannot send text messages")]
    CannotSendMessages,

    // -- Location errors --
    /// Location acquisition failed.
    #[error(transparent)]
    Location(#[from] LocationError),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- Service errors --
    /// A service operation failed.
    #[error("service error: {0}")]
    Service(String),

    // -- Generic --
    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for ScError {
    fn from(e: serde_json::Error) -> Self {
        ScError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for ScError {
    fn from(e: toml::de::Error) -> Self {
        ScError::Config(e.to_string())
    }
}

/// Validation failures when adding a trust partner.
///
/// The display strings are shown to the user unchanged, so they are phrased
/// as end-user guidance rather than log lines.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddPartnerError {
    /// The number contained no digits after cleaning.
    #[error("The phone number cannot be blank. Please enter a valid number.")]
    BlankNumber,

    /// The cleaned number matches neither accepted mobile shape.
    #[error("The phone number format is incorrect. Please enter a valid South African mobile number (e.g., 0721234567 or +27721234567).")]
    InvalidFormat,

    /// The cleaned number already belongs to a partner in the list.
    #[error("This phone number is already in your Trust Partners list.")]
    DuplicateNumber,
}

/// Failures while acquiring a single location fix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// Location permission is not granted (denied, restricted, or never asked).
    #[error("Location permission was denied. Please enable it in Settings.")]
    PermissionDenied,

    /// The timeout task won the acquisition race.
    #[error("Getting location timed out.")]
    Timeout,

    /// Another acquisition already holds the request ticket.
    #[error("another location request is already in progress")]
    RequestInFlight,

    /// The platform provider reported an error of its own.
    #[error("{0}")]
    Provider(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_partner_error_messages() {
        assert_eq!(
            AddPartnerError::BlankNumber.to_string(),
            "The phone number cannot be blank. Please enter a valid number."
        );
        assert_eq!(
            AddPartnerError::DuplicateNumber.to_string(),
            "This phone number is already in your Trust Partners list."
        );
        assert!(AddPartnerError::InvalidFormat
            .to_string()
            .contains("South African mobile number"));
    }

    #[test]
    fn test_location_error_messages() {
        assert_eq!(
            LocationError::Timeout.to_string(),
            "Getting location timed out."
        );
        assert_eq!(
            LocationError::Provider("gps hardware unavailable".into()).to_string(),
            "gps hardware unavailable"
        );
    }

    #[test]
    fn test_transparent_conversions() {
        let err: ScError = AddPartnerError::BlankNumber.into();
        assert_eq!(
            err.to_string(),
            "The phone number cannot be blank. Please enter a valid number."
        );

        let err: ScError = LocationError::PermissionDenied.into();
        assert_eq!(
            err.to_string(),
            "Location permission was denied. Please enable it in Settings."
        );
    }

    #[test]
    fn test_sc_error_display() {
        let err = ScError::Database("disk full".to_string());
        assert_eq!(err.to_string(), "database error: disk full");
    }
}
