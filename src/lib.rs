//! # PDF Presenter Library
//!
//! Presentation mode for a PDF viewer, driven by mouse, keyboard, touch and gamepads.
//!
//! This library provides the fullscreen presentation state machine, the event bus
//! it reports on, and a gamepad dispatcher that turns button presses into page turns.

pub mod app;
pub mod config;
pub mod error;
pub mod event_bus;
pub mod gamepad;
pub mod headless;
pub mod input;
pub mod presentation;
pub mod viewer;
