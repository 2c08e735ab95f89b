//! SafeCircle Services - Business logic and service layer.
//!
//! This crate provides the service trait and the concrete services covering:
//! - Trust partner store (CRUD with the single-primary invariant,
//!   write-through persistence, phone validation and deduplication)
//! - Location acquisition (permission gate, request ticket, two-task
//!   fetch-vs-timeout race with loser cancellation)
//! - Emergency message composition (template fill, location annotation
//!   priority chain, the Get Help state machine)
//! - Event bus (typed change notification over tokio broadcast)
//! - Collaborator traits for the platform pieces consumed as black boxes
//!   (location provider, message composer, contact picker)

pub mod event_bus;
pub mod location;
pub mod message;
pub mod partner;
pub mod service;

// Re-export key types
pub use event_bus::{AppEvent, EventBus};
pub use location::{GeoFix, LocationProvider, LocationService, PermissionStatus};
pub use message::{ComposeResult, GetHelpState, MessageComposer, MessagePreferences, MessageService};
pub use partner::{ContactPicker, PartnerService, PickedContact};
pub use service::{Service, ServiceState};
