//! Shopfloor Core - Shared domain types.
//!
//! This crate provides the types used by the storefront to assemble pages:
//! - typed entity ids and prices
//! - the entities a sales channel is configured with (countries, payment
//!   and shipping methods) and the cart
//! - ordered entity collections and search criteria
//! - the per-request [`SalesChannelContext`]
//! - eligibility predicates used to narrow collections for a context
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. Repositories and services that fill these types live in
//! the storefront crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod context;
pub mod criteria;
pub mod entity;
pub mod merge;
pub mod rules;
pub mod types;

pub use context::{ReadContext, SalesChannelContext};
pub use criteria::{Criteria, EqualsFilter};
pub use entity::*;
pub use merge::merge_present;
pub use rules::{AllOf, AvailabilityRules, EligibleFn, IsEligible, RuleScoped};
pub use types::*;
