//! Interface version gate.
//!
//! Callers pass the version they were built against to every bootstrap entry
//! point. Patch releases are backward compatible but not forward compatible,
//! and beta builds only interoperate with themselves.

use std::fmt;

use thiserror::Error;

/// Patch components above this value mark a beta build.
const BETA_THRESHOLD: u32 = 50;

/// A version packed as `major * 10000 + minor * 100 + patch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntVersion(u32);

impl IntVersion {
    /// Packs the three components.
    ///
    /// # Panics
    ///
    /// Panics when [`IntVersion::try_new`] would return `None`. In a constant
    /// this is a compile-time error.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        match Self::try_new(major, minor, patch) {
            Some(version) => version,
            None => panic!("version components out of range"),
        }
    }

    /// Packs the three components, or returns `None` when `minor` or `patch`
    /// is 100 or more, or when `major` does not fit the packed form.
    #[must_use]
    pub const fn try_new(major: u32, minor: u32, patch: u32) -> Option<Self> {
        if minor >= 100 || patch >= 100 {
            return None;
        }
        match major.checked_mul(10_000) {
            Some(base) => match base.checked_add(minor * 100 + patch) {
                Some(packed) => Some(Self(packed)),
                None => None,
            },
            None => None,
        }
    }

    /// Wraps an already packed value.
    #[must_use]
    pub const fn from_packed(packed: u32) -> Self {
        Self(packed)
    }

    /// The packed representation.
    #[must_use]
    pub const fn packed(self) -> u32 {
        self.0
    }

    /// Major component.
    #[must_use]
    pub const fn major(self) -> u32 {
        self.0 / 10_000
    }

    /// Minor component.
    #[must_use]
    pub const fn minor(self) -> u32 {
        (self.0 / 100) % 100
    }

    /// Patch remainder, including the beta offset.
    #[must_use]
    pub const fn patch(self) -> u32 {
        self.0 % 100
    }

    /// Returns `true` for beta builds (patch remainder above 50).
    #[must_use]
    pub const fn is_beta(self) -> bool {
        self.patch() > BETA_THRESHOLD
    }

    const fn major_minor(self) -> u32 {
        self.0 / 100
    }
}

impl fmt::Display for IntVersion {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_beta() {
            write!(
                formatter,
                "{}.{}b{}",
                self.major(),
                self.minor(),
                self.patch() - BETA_THRESHOLD
            )
        } else {
            write!(formatter, "{}.{}.{}", self.major(), self.minor(), self.patch())
        }
    }
}

/// Version this runtime was compiled as.
pub const RUNTIME_VERSION: IntVersion = IntVersion::new(3, 7, 10);

/// Whether the gate enforces compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionPolicy {
    /// Apply the compatibility rules.
    Strict,
    /// Accept every caller version.
    Ignore,
}

impl VersionPolicy {
    /// Policy selected at build time through the `ignore-version` feature.
    pub const COMPILED: Self = if cfg!(feature = "ignore-version") {
        Self::Ignore
    } else {
        Self::Strict
    };
}

/// The caller's interface version cannot be served by this runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("interface version {caller} is incompatible with runtime version {runtime}")]
pub struct VersionMismatch {
    /// Version of the runtime performing the check.
    pub runtime: IntVersion,
    /// Version declared by the caller.
    pub caller: IntVersion,
}

/// Checks `caller` against [`RUNTIME_VERSION`] under [`VersionPolicy::COMPILED`].
pub fn check_version(caller: IntVersion) -> Result<(), VersionMismatch> {
    check_compatibility(RUNTIME_VERSION, caller, VersionPolicy::COMPILED)
}

/// Applies the compatibility rules between a runtime and a caller version.
///
/// A beta runtime requires an exact match. Otherwise major and minor must
/// match, beta callers are rejected, and the caller's patch level must not
/// exceed the runtime's.
pub fn check_compatibility(
    runtime: IntVersion,
    caller: IntVersion,
    policy: VersionPolicy,
) -> Result<(), VersionMismatch> {
    if policy == VersionPolicy::Ignore {
        return Ok(());
    }

    let compatible = if runtime.is_beta() {
        runtime == caller
    } else {
        runtime.major_minor() == caller.major_minor()
            && !caller.is_beta()
            && caller.patch() <= runtime.patch()
    };

    if compatible {
        Ok(())
    } else {
        Err(VersionMismatch { runtime, caller })
    }
}
