//! Core types shared across the protocol layer.

pub mod error;
