// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod stage_metadata;

pub mod consts;

pub use loader::{
    load_and_validate_config, load_config, parse_json, parse_toml, parse_yaml, StageSpec,
    TaskConfig,
};
pub use stage_metadata::StageMetadata;
