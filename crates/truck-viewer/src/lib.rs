//! Interactive truck steering scene using Bevy.
//!
//! This library exposes the telemetry writer for the headless trace.

pub mod telemetry;
