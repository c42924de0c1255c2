//! Traffic Visualization Client Library
//!
//! Polls an external traffic simulation server and animates its cars,
//! traffic lights and scenery, either headless or with a Bevy UI.

pub mod client;
pub mod stats;

#[cfg(feature = "ui")]
pub mod ui;
