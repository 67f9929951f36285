//! Foundation types for solidify.
//!
//! This crate provides the data-model contracts shared by the packing, image
//! and commitment crates. Every other solidify crate depends on
//! `solidify-types`.
//!
//! # Key Types
//!
//! - [`Field`]: Anything that can be serialized into a storage bucket
//! - [`LabelledField`]: A [`Field`] addressable by a 16-bit label
//! - [`Token`]: A token id together with its encoded feature codes
//! - [`StringField`]: UTF-8 text as a [`Field`]
//! - [`Hash256`]: A 32-byte digest as used on-chain

pub mod error;
pub mod field;
pub mod hash;
pub mod token;

pub use error::{FieldError, TypeError};
pub use field::{Field, FieldsGroup, LabelledField, StringField};
pub use hash::Hash256;
pub use token::{Token, MAX_FEATURES};
