// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in transforms. All of them are synchronous and hold no per-record state.

mod copy_field;
mod json;
mod sequence_id;
mod set_metadata;

pub use copy_field::CopyFieldTransform;
pub use json::{JsonArrayTransform, JsonTransform};
pub use sequence_id::{SequenceGenerator, SequenceIdTransform};
pub use set_metadata::SetMetadataTransform;
