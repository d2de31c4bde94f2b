//! WM8778 audio codec driver module.
//!
//! Drives the codec's SPI control port: power-on wait, register reset, and
//! sample format for both converters. After [`AudioCodec::configure`] the
//! codec is left alone; audio flows over the I2S lines only.
//!
//! # Feature gate
//!
//! This module is available when the `wm8778` feature is enabled (on by default).
//!
//! [`AudioCodec::configure`]: crate::control::AudioCodec::configure

pub(crate) mod registers;
mod wm8778;

pub use wm8778::{Error, Wm8778};
