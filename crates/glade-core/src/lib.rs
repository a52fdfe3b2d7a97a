//! Glade Core - Foundational types for the Glade engine
//!
//! This crate provides the core types that all other Glade crates depend on:
//! - `EntityId`, `ModelId` - Stable identifiers for scene tables
//! - `Vec2`, `Vec3`, `Color` - Spatial and colour types
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{GladeError, Result};
pub use id::{EntityId, ModelId};
pub use types::{Color, Vec2, Vec3};
