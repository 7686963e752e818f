// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod discard;
mod jsonl;
mod log;

pub use discard::DiscardConsumer;
pub use jsonl::JsonLinesConsumer;
pub use log::LogConsumer;
