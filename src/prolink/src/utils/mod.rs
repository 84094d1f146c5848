//! Shared utilities for the codec.

pub mod bytes;
