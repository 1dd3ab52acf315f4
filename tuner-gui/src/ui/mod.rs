//! # UI Module
//!
//! This module contains all UI components for the violin tuner.

pub mod cent_meter;
pub mod main_display;
