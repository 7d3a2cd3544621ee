// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error and fault types.

use core::fmt;

/// Package name reported by every [`Fault`].
pub const PACKAGE: &str = "kd";

/// Kind of a fatal fault.
///
/// Faults are programmer errors: the tree was asked to do something that
/// breaks its contract, or its internal structure was found inconsistent.
/// Each kind keeps a stable numeric code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// A bulk build was started with no items.
    EmptyBuild,
    /// The builder could not select a median for a partition.
    BadMedian,
    /// A node was not found under the parent recorded for it.
    BadParent,
    /// The item being inserted is already on its insertion path.
    Duplicate,
}

impl FaultKind {
    /// Stable numeric code for this fault.
    pub const fn code(self) -> i32 {
        match self {
            Self::EmptyBuild => 1,
            Self::BadMedian => 2,
            Self::BadParent => 3,
            Self::Duplicate => 4,
        }
    }

    /// Human-readable description.
    pub const fn message(self) -> &'static str {
        match self {
            Self::EmptyBuild => "attempt to build from no data",
            Self::BadMedian => "bad median",
            Self::BadParent => "bad father node",
            Self::Duplicate => "attempt to insert duplicate item",
        }
    }
}

/// A fatal fault raised by the tree.
///
/// Carries the `(package, code, message)` triple. The tree never aborts on a
/// fault; it is returned inside [`KdError::Fault`] and the caller decides
/// whether to continue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fault {
    kind: FaultKind,
}

impl Fault {
    /// Record a fault of the given kind.
    pub(crate) fn raise(kind: FaultKind) -> Self {
        log::warn!("{PACKAGE}: fault {}: {}", kind.code(), kind.message());
        Self { kind }
    }

    /// The fault kind.
    pub const fn kind(&self) -> FaultKind {
        self.kind
    }

    /// Package that raised the fault; always `"kd"`.
    pub const fn package(&self) -> &'static str {
        PACKAGE
    }

    /// Numeric fault code.
    pub const fn code(&self) -> i32 {
        self.kind.code()
    }

    /// Human-readable message.
    pub const fn message(&self) -> &'static str {
        self.kind.message()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fault {}: {}", PACKAGE, self.code(), self.message())
    }
}

impl core::error::Error for Fault {}

/// Errors returned by tree operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KdError {
    /// The requested item is not in the tree. Recoverable.
    NotFound,
    /// A fatal fault; see [`Fault`].
    Fault(Fault),
}

impl KdError {
    /// Whether this error is a fatal fault rather than a recoverable status.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fault(_))
    }

    /// The fault, if this is one.
    pub const fn fault(&self) -> Option<Fault> {
        match self {
            Self::Fault(f) => Some(*f),
            Self::NotFound => None,
        }
    }

    pub(crate) fn fault_of(kind: FaultKind) -> Self {
        Self::Fault(Fault::raise(kind))
    }
}

impl From<Fault> for KdError {
    fn from(f: Fault) -> Self {
        Self::Fault(f)
    }
}

impl fmt::Display for KdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("k-d error: data not found"),
            Self::Fault(fault) => fmt::Display::fmt(fault, f),
        }
    }
}

impl core::error::Error for KdError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Fault(f) => Some(f),
            Self::NotFound => None,
        }
    }
}
