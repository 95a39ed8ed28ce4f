//! # Widgets Module
//!
//! Canvas widgets for the scale wheel application.

pub mod fretboard;
pub mod wheel;
