//! Single-file image and document transformer
//!
//! Compresses, resizes or converts one raster image (JPEG, PNG, GIF, WebP)
//! into JPEG, PNG or WebP. PDF documents pass through unchanged under a new
//! name.

pub mod app;
pub mod error;
pub mod mime;
pub mod models;
pub mod session;
pub mod transform;

pub use error::{Error, Result};
