#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Shared utilities for bundleplan.
//!
//! Pure helpers with no logging dependencies: content hashing for output
//! fingerprints and crash-safe descriptor writes.

pub mod fs;
pub mod hash;
