//! Client directory.
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod client;

pub use client::{Client, ClientDraft};
