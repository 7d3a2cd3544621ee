// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree configuration.

/// Default cap on the depth of the balanced builder.
pub const DEFAULT_MAX_BUILD_DEPTH: usize = 100_000;

/// Per-tree tuning knobs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KdConfig {
    /// Deepest level (root is level 1) the balanced builder fills before it
    /// spills the remaining items to plain insertion.
    ///
    /// `0` turns the builder off and every item is inserted one at a time.
    pub max_build_depth: usize,
}

impl Default for KdConfig {
    fn default() -> Self {
        Self {
            max_build_depth: DEFAULT_MAX_BUILD_DEPTH,
        }
    }
}

impl KdConfig {
    /// Config with the given builder depth cap.
    pub const fn with_max_build_depth(max_build_depth: usize) -> Self {
        Self { max_build_depth }
    }
}
