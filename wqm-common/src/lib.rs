//! # WQM Common Library
//!
//! Shared code for the water-quality map tools:
//! - Reading model with loosely typed wire fields
//! - Geotag classification (tagged / untagged partition)
//! - Bootstrap configuration loading
//! - Common error types

pub mod classify;
pub mod config;
pub mod error;
pub mod reading;

pub use classify::{partition, Partition};
pub use error::{Error, Result};
pub use reading::{Coordinates, LooseValue, Potability, Reading};
