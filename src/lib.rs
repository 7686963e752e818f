// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // stage adapters
pub mod config;        // task config loading
pub mod engine;        // task orchestration
pub mod errors;        // error handling
pub mod observability; // structured log messages
pub mod record;        // records and channels
pub mod registry;      // plugin registries
pub mod traits;        // stage capability traits
pub mod utils;
