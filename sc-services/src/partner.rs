//! Trust partner store with the single-primary invariant.
//!
//! Owns the ordered partner list, validates and deduplicates phone numbers,
//! and writes the full-list snapshot through to storage on every mutation.
//! Change notification goes out on the event bus so the store is observable
//! outside a UI context.
//!
//! A persistence failure surfaces as an `Err` from the mutating call; the
//! in-memory mutation is retained, so the caller decides whether to retry
//! or reload.

use tracing::{debug, info, warn};
use uuid::Uuid;

use sc_core::error::{AddPartnerError, ScError, ScResult};
use sc_models::models::partner::{canonical_subscriber, clean_phone_number, is_valid_mobile_number};
use sc_models::{Database, PartnerList, TrustPartner};

use crate::event_bus::{AppEvent, EventBus};
use crate::service::{Service, ServiceState};

/// A contact chosen through the platform contact picker.
#[derive(Debug, Clone)]
pub struct PickedContact {
    pub name: String,
    pub phone_number: String,
}

/// Contact-picker collaborator (the platform address book UI).
pub trait ContactPicker {
    /// Let the user pick a contact; `None` when the picker was cancelled.
    fn pick(&self) -> ScResult<Option<PickedContact>>;
}

/// Service owning the trust partner list.
pub struct PartnerService {
    state: ServiceState,
    database: Database,
    event_bus: EventBus,
    partners: Vec<TrustPartner>,
}

impl PartnerService {
    /// Create a new PartnerService. The list is empty until `init`/`load`.
    pub fn new(database: Database, event_bus: EventBus) -> Self {
        Self {
            state: ServiceState::Created,
            database,
            event_bus,
            partners: Vec::new(),
        }
    }

    /// Load the persisted snapshot into memory and repair the invariant.
    pub fn load(&mut self) -> ScResult<()> {
        let conn = self.database.conn()?;
        self.partners = PartnerList::load(&conn)?;
        debug!("loaded {} trust partner(s)", self.partners.len());
        Ok(())
    }

    /// The current partner list, insertion order = display order.
    pub fn partners(&self) -> &[TrustPartner] {
        &self.partners
    }

    /// The partner designated to receive the "Get Help" message.
    pub fn primary_partner(&self) -> Option<&TrustPartner> {
        self.partners.iter().find(|p| p.is_primary)
    }

    /// Whether any partner is currently designated primary.
    pub fn has_primary_selected(&self) -> bool {
        self.primary_partner().is_some()
    }

    /// Validate and append a new partner.
    ///
    /// The raw number is cleaned first and the cleaned form is what gets
    /// stored. Duplicate detection compares canonical subscriber forms, so
    /// the local and international spellings of one number collide. The
    /// first partner added to an empty list becomes primary.
    pub fn add(&mut self, name: &str, raw_phone_number: &str) -> ScResult<TrustPartner> {
        let cleaned = clean_phone_number(raw_phone_number);

        if cleaned.is_empty() {
            return Err(AddPartnerError::BlankNumber.into());
        }

        if !is_valid_mobile_number(&cleaned) {
            debug!("rejected phone number {raw_phone_number:?} (cleaned: {cleaned:?})");
            return Err(AddPartnerError::InvalidFormat.into());
        }

        let canonical = canonical_subscriber(&cleaned);
        if self
            .partners
            .iter()
            .any(|p| canonical_subscriber(&clean_phone_number(&p.phone_number)) == canonical)
        {
            return Err(AddPartnerError::DuplicateNumber.into());
        }

        let mut partner = TrustPartner::new(name, cleaned);
        if self.partners.is_empty() {
            partner.is_primary = true;
        }
        self.partners.push(partner.clone());
        self.persist()?;

        info!("added trust partner {} ({})", partner.name, partner.phone_number);
        self.event_bus.emit(AppEvent::PartnerAdded {
            id: partner.id,
            name: partner.name.clone(),
        });
        Ok(partner)
    }

    /// Remove a partner by id. Returns false when no entry matched.
    ///
    /// Removing the primary promotes the new first element when the list
    /// stays non-empty; removing the last partner leaves an empty list with
    /// no primary.
    pub fn remove(&mut self, id: Uuid) -> ScResult<bool> {
        let Some(index) = self.partners.iter().position(|p| p.id == id) else {
            warn!("remove requested for unknown partner id {id}");
            return Ok(false);
        };

        let removed = self.partners.remove(index);
        if removed.is_primary {
            if let Some(first) = self.partners.first_mut() {
                first.is_primary = true;
            }
        }
        self.persist()?;

        info!("removed trust partner {}", removed.name);
        self.event_bus.emit(AppEvent::PartnerRemoved {
            id,
            was_primary: removed.is_primary,
        });
        Ok(true)
    }

    /// Remove every partner.
    pub fn remove_all(&mut self) -> ScResult<()> {
        self.partners.clear();
        self.persist()?;

        info!("removed all trust partners");
        self.event_bus.emit(AppEvent::PartnersCleared);
        Ok(())
    }

    /// Make the matching partner primary and demote all others.
    ///
    /// Persists (and notifies) only when the flags actually changed, so
    /// re-selecting the current primary never writes. An unknown id is an
    /// error and changes nothing.
    pub fn set_primary(&mut self, id: Uuid) -> ScResult<()> {
        if !self.partners.iter().any(|p| p.id == id) {
            return Err(ScError::PartnerNotFound(id.to_string()));
        }

        let mut changed = false;
        for partner in &mut self.partners {
            let should_be_primary = partner.id == id;
            if partner.is_primary != should_be_primary {
                changed = true;
            }
            partner.is_primary = should_be_primary;
        }

        if changed {
            self.persist()?;
            info!("primary partner changed to {id}");
            self.event_bus.emit(AppEvent::PrimaryChanged { id });
        }
        Ok(())
    }

    /// Number of partners in the list.
    pub fn count(&self) -> usize {
        self.partners.len()
    }

    fn persist(&self) -> ScResult<()> {
        let conn = self.database.conn()?;
        PartnerList::save(&conn, &self.partners)
    }
}

impl Service for PartnerService {
    fn name(&self) -> &str {
        "partner"
    }
    fn state(&self) -> ServiceState {
        self.state
    }
    fn init(&mut self) -> ScResult<()> {
        self.load()?;
        self.state = ServiceState::Running;
        info!("partner service initialized");
        Ok(())
    }
    fn shutdown(&mut self) -> ScResult<()> {
        self.state = ServiceState::Stopped;
        Ok(())
    }
}
