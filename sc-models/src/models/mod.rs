//! Entity models.

pub mod partner;

pub use partner::{PartnerList, TrustPartner};
