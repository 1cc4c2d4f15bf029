//! Shared helpers for the derive implementation.

pub mod syn_types;
