//! `nexus-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage, no network).

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod numeric;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::RecordId;
pub use money::CurrencyFormat;
