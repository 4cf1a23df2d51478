//! Derived views computed from the raw collections on every read.
//!
//! Nothing here is materialised: availability, request status and campaign
//! totals are recomputed by joining at query time.

pub mod campaigns;
pub mod pagination;
pub mod pets;
pub mod reference;

pub use pagination::{Page, PageQuery, PageRequest};
