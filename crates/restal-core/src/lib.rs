//! Core types for restal.
//!
//! This crate provides the configuration types shared across the restal
//! crates: the upstream Postgres connection, the HTTP listener, and the
//! per-table access rules enforced by the adapter's access gate.

pub mod config;

pub use config::{
    AccessConfig, ConfigError, HttpConfig, Operation, RestalConfig, TableRule, UpstreamConfig,
};
