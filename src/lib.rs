//! Single-image and slideshow viewer.
//!
//! [`catalog`] and [`viewport`] hold the navigation and zoom logic and know
//! nothing about windows; [`ui`] drives them from a winit event loop.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod slideshow;
pub mod ui;
pub mod viewport;
