// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build errors.

use std::collections::TryReserveError;

/// Reasons a tree build can fail. The tree is left empty after any of these.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The datasets contain no primitives.
    #[error("no primitives to partition")]
    NoPrimitives,

    /// Every axis of the combined bounds has zero extent.
    #[error("input bounds have zero extent on every axis")]
    DegenerateBounds,

    /// The centroid array could not be allocated.
    #[error("failed to allocate centroids for {count} primitives")]
    Allocation {
        /// Number of primitives requested.
        count: usize,
        /// Underlying allocator error.
        #[source]
        source: TryReserveError,
    },
}
