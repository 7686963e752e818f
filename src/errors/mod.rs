// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod stage;

pub use config::ConfigError;
pub use stage::StageError;
