//! specbars: a terminal audio spectrum analyzer.
//!
//! Audio from a [`source::SampleSource`] is cut into frames, transformed,
//! converted to decibels, calibrated against the range learned from the first
//! values, and drawn as an in-place bar chart by a [`render::Renderer`].

pub mod analysis;
pub mod app;
pub mod commands;
pub mod config;
pub mod logging;
pub mod render;
pub mod source;
