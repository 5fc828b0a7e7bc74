//! An e-paper picture frame that shows generated art.
//!
//! Every refresh picks a provider by weight: an image from a local folder, a
//! previously generated one, or a fresh one from a text-to-image service fed
//! with a prompt built from weighted line files. The picture is fitted to the
//! display, captioned and marked with a status icon.

pub mod config;
pub mod display;
pub mod easel;
pub mod history;
pub mod overlay;
pub mod sources;

pub use crate::easel::{Easel, Outcome, Provider, Request};
