//! HTTP mirror of the finance book: per-collection JSON records over REST.

pub mod app;
pub mod config;
pub mod repository;
