//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "SafeCircle";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Database schema version.
pub const DB_SCHEMA_VERSION: i32 = 1;

/// Default bound on a single location acquisition, in seconds.
pub const DEFAULT_LOCATION_TIMEOUT_SECS: u64 = 10;

/// Placeholder in message templates, substituted with the primary
/// partner's display name.
pub const NAME_PLACEHOLDER: &str = "{NAME}";

/// Default emergency message template.
pub const DEFAULT_MESSAGE_TEMPLATE: &str =
    "You are part of my safety circle, {NAME}. I am feeling vulnerable right now and need you to contact me.";

/// Default text for the user-editable custom message.
pub const DEFAULT_CUSTOM_MESSAGE_TEXT: &str =
    "I'm using a custom message and need help. Please contact me.";

/// Lead-in for the map-link line appended when a fix is obtained.
pub const LOCATION_LEAD_IN: &str = "My current location is approximately";

/// Base URL for the embedded map link; coordinates are appended as `lat,lon`.
pub const MAPS_QUERY_URL: &str = "https://maps.google.com/?q=";

/// Storage keys for persisted state.
///
/// The version suffix (`_v1`, `_v2`) invalidates older serialized formats
/// on schema change: a new format gets a new key and the old blob is simply
/// never read again.
pub mod keys {
    /// Serialized trust partner list snapshot.
    pub const TRUST_PARTNERS: &str = "trustPartners_v2";

    /// Whether the user's custom message replaces the default template.
    pub const USE_CUSTOM_MESSAGE: &str = "useCustomEmergencyMessage_v1";

    /// The user's custom message text.
    pub const CUSTOM_MESSAGE_TEXT: &str = "customEmergencyMessageText_v1";

    /// Whether the outgoing message should include the current location.
    pub const INCLUDE_LOCATION: &str = "includeLocationInMessage_v1";

    /// One-time welcome notice gate.
    pub const WELCOME_SHOWN: &str = "hasShownTrustPartnerWelcomeAlert_v1";
}

/// Fixed annotation sentences appended to the outgoing message when no map
/// link can be embedded. These are part of the message wire format; do not
/// reword them casually.
pub mod annotations {
    /// The provider resolved but had no fix to offer.
    pub const NO_FIX: &str = "(Could not retrieve current location details.)";

    /// Permission was revoked between the status check and the fetch.
    pub const DENIED_DURING_FETCH: &str =
        "(Location permission denied unexpectedly during fetch. Please check Settings.)";

    /// The timeout task won the acquisition race.
    pub const TIMED_OUT: &str = "(Could not retrieve location: timed out.)";

    /// The user disabled location sharing in message settings.
    pub const SHARING_OFF: &str = "(Location sharing turned off by user in settings.)";

    /// App-level permission is denied or restricted.
    pub const SERVICES_DISABLED: &str =
        "(Location services disabled or restricted for this app.)";

    /// Permission has never been requested or answered.
    pub const NOT_DETERMINED: &str =
        "(Location permission not yet determined. Please try again or check Settings.)";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_contains_placeholder() {
        assert!(DEFAULT_MESSAGE_TEMPLATE.contains(NAME_PLACEHOLDER));
    }

    #[test]
    fn test_storage_keys_are_versioned() {
        assert!(keys::TRUST_PARTNERS.ends_with("_v2"));
        assert!(keys::USE_CUSTOM_MESSAGE.ends_with("_v1"));
        assert!(keys::CUSTOM_MESSAGE_TEXT.ends_with("_v1"));
        assert!(keys::INCLUDE_LOCATION.ends_with("_v1"));
    }

    #[test]
    fn test_annotations_are_parenthesized() {
        for s in [
            annotations::NO_FIX,
            annotations::DENIED_DURING_FETCH,
            annotations::TIMED_OUT,
            annotations::SHARING_OFF,
            annotations::SERVICES_DISABLED,
            annotations::NOT_DETERMINED,
        ] {
            assert!(s.starts_with('(') && s.ends_with(')'));
        }
    }
}
