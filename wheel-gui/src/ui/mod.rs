//! # UI Module
//!
//! This module contains the layout of the scale wheel application.

pub mod main_display;
