//! Trust partner records and the persisted partner list snapshot.
//!
//! A trust partner is a user-designated emergency contact: display name,
//! cleaned phone number, and the primary flag. The whole list is persisted
//! as one JSON snapshot under a fixed storage key; the wire field names are
//! pinned so snapshots stay readable across versions sharing the key.

use lazy_static::lazy_static;
use regex::Regex;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use sc_core::constants::keys;
use sc_core::error::ScResult;

use crate::storage::Storage;

/// A user-designated emergency contact.
///
/// Within the owning list at most one partner has `is_primary = true`;
/// exactly one when the list is non-empty. `PartnerList` repairs violations
/// on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrustPartner {
    /// Stable unique identifier, generated at creation.
    pub id: Uuid,
    /// Display name, free text from the contact picker.
    pub name: String,
    /// Cleaned phone number (digits plus optional leading `+`).
    pub phone_number: String,
    /// Whether this partner receives the "Get Help" message.
    pub is_primary: bool,
}

impl TrustPartner {
    /// Create a new, non-primary partner with a fresh id.
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            phone_number: phone_number.into(),
            is_primary: false,
        }
    }
}

/// The persisted partner list snapshot under `trustPartners_v2`.
pub struct PartnerList;

impl PartnerList {
    /// Load the snapshot from storage.
    ///
    /// A missing key yields an empty list. An undecodable blob fails soft:
    /// it is logged and treated as empty. The primary-consistency rule runs
    /// on whatever was loaded; repairs are in-memory only and get written
    /// by the next mutation.
    pub fn load(conn: &Connection) -> ScResult<Vec<TrustPartner>> {
        let mut partners: Vec<TrustPartner> = match Storage::get(conn, keys::TRUST_PARTNERS)? {
            None => Vec::new(),
            Some(blob) => match serde_json::from_str(&blob) {
                Ok(list) => list,
                Err(e) => {
                    warn!("failed to decode trust partners snapshot: {e}");
                    Vec::new()
                }
            },
        };

        Self::ensure_primary_consistency(&mut partners);
        Ok(partners)
    }

    /// Write the full-list snapshot to storage.
    pub fn save(conn: &Connection, partners: &[TrustPartner]) -> ScResult<()> {
        Storage::set_json(conn, keys::TRUST_PARTNERS, &partners)
    }

    /// Repair the single-primary invariant in place.
    ///
    /// Zero primaries in a non-empty list: the first entry is promoted.
    /// More than one primary: all but the first (in list order) are demoted.
    /// Returns whether anything changed.
    pub fn ensure_primary_consistency(partners: &mut [TrustPartner]) -> bool {
        let primary_count = partners.iter().filter(|p| p.is_primary).count();

        if primary_count == 0 {
            if let Some(first) = partners.first_mut() {
                first.is_primary = true;
                return true;
            }
            return false;
        }

        if primary_count > 1 {
            let mut seen_first = false;
            for partner in partners.iter_mut().filter(|p| p.is_primary) {
                if seen_first {
                    partner.is_primary = false;
                } else {
                    seen_first = true;
                }
            }
            return true;
        }

        false
    }
}

/// Reduce a raw phone number to digits and an optional leading `+`.
///
/// Digits survive anywhere; a `+` survives only as the first character of
/// the cleaned result, so formatting like `(+27) 72 123-4567` cleans to
/// `+27721234567` while a stray interior `+` is dropped.
pub fn clean_phone_number(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_digit() || (c == '+' && cleaned.is_empty()) {
            cleaned.push(c);
        }
    }
    cleaned
}

lazy_static! {
    // Local form: leading 0, second digit 6/7/8, then 8 more digits.
    static ref LOCAL_MOBILE: Regex = Regex::new(r"^0[678]\d{8}$").unwrap();
    // International form: +27, then 6/7/8, then 8 more digits.
    static ref INTERNATIONAL_MOBILE: Regex = Regex::new(r"^\+27[678]\d{8}$").unwrap();
}

/// Whether a cleaned number is a valid South African mobile number in
/// either the local (`0721234567`) or international (`+27721234567`) shape.
pub fn is_valid_mobile_number(cleaned: &str) -> bool {
    LOCAL_MOBILE.is_match(cleaned) || INTERNATIONAL_MOBILE.is_match(cleaned)
}

/// Canonical per-subscriber form used for duplicate comparison.
///
/// Folds the international `+27` spelling onto the local `0` spelling so
/// both spellings of one subscriber compare equal.
pub fn canonical_subscriber(cleaned: &str) -> String {
    match cleaned.strip_prefix("+27") {
        Some(rest) => format!("0{rest}"),
        None => cleaned.to_string(),
    }
}
