//! # CYTGM Common Library
//!
//! Shared code for the CYTGM video player modules including:
//! - Event types (CytgmEvent enum) and the EventBus
//! - Catalog video model
//! - Bootstrap configuration loading
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod events;
pub mod time;
pub mod video;

pub use error::{Error, Result};
pub use video::{Video, VideoRef};
