// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Smallest worker pool a task runs with
pub const MIN_THREAD_COUNT: usize = 1;
/// Record channel capacity for built-in producers that do not configure `buffer`
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;
/// Largest `buffer` a producer accepts
pub const MAX_CHANNEL_CAPACITY: usize = 65_536;
/// Metadata key written by `sequence_id` when no `key` is configured
pub const DEFAULT_SEQUENCE_KEY: &str = "id";
