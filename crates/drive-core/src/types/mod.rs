//! Core type definitions used across the drive workspace.

pub mod id;

pub use id::*;
