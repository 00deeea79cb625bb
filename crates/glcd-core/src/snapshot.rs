//! Versioned snapshot of protocol-visible device state.
//!
//! A snapshot captures everything firmware could observe through the bus:
//! latched pin levels, the data latch, both halves' register files, and
//! the pixel store. Sinks, diagnostics counters, and in-flight dispatch
//! state are host-side concerns and are not captured; import clears the
//! reentrancy guard and leaves counters untouched.

use thiserror::Error;

use crate::chip::ControllerHalf;
use crate::framebuffer::FRAMEBUFFER_BYTES;

/// Stable snapshot wire-version identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u16)]
pub enum SnapshotVersion {
    /// Initial schema revision for glcd-core v0.1.x.
    V1 = 1,
}

impl SnapshotVersion {
    /// Converts a wire value into a known snapshot version.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::UnsupportedVersion`] for unknown values.
    pub const fn try_from_u16(version: u16) -> Result<Self, SnapshotError> {
        match version {
            1 => Ok(Self::V1),
            other => Err(SnapshotError::UnsupportedVersion(other)),
        }
    }

    /// The stable wire value of this version.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Import failure categories for snapshot restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SnapshotError {
    /// The wire version is not one this build understands.
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u16),
    /// The flattened pixel store has the wrong size for the display
    /// geometry this build was compiled with.
    #[error("framebuffer geometry mismatch: expected {expected} bytes, got {actual}")]
    GeometryMismatch {
        /// Bytes the current geometry requires.
        expected: usize,
        /// Bytes the snapshot carried.
        actual: usize,
    },
}

/// Serializable full-state snapshot used for import/export and replay
/// fixtures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct GlcdSnapshot {
    /// Snapshot schema version.
    pub version: SnapshotVersion,
    /// Raw latched pin bitfield, bit positions per
    /// [`crate::pins::PinId`].
    pub pins: u16,
    /// Last byte sampled from or driven onto the data bus.
    pub data_latch: u8,
    /// Register files of both halves, indexed by
    /// [`crate::chip::Half::index`].
    pub halves: [ControllerHalf; 2],
    /// Flattened page-major pixel store, [`FRAMEBUFFER_BYTES`] long.
    pub framebuffer: Box<[u8]>,
}

impl GlcdSnapshot {
    /// Validates the snapshot against the compiled display geometry.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::GeometryMismatch`] when the flattened
    /// pixel store length does not match.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.framebuffer.len() == FRAMEBUFFER_BYTES {
            Ok(())
        } else {
            Err(SnapshotError::GeometryMismatch {
                expected: FRAMEBUFFER_BYTES,
                actual: self.framebuffer.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GlcdSnapshot, SnapshotError, SnapshotVersion};
    use crate::chip::ControllerHalf;
    use crate::framebuffer::FRAMEBUFFER_BYTES;

    #[test]
    fn version_roundtrip_is_stable() {
        assert_eq!(SnapshotVersion::try_from_u16(1), Ok(SnapshotVersion::V1));
        assert_eq!(SnapshotVersion::V1.as_u16(), 1);
        assert_eq!(
            SnapshotVersion::try_from_u16(2),
            Err(SnapshotError::UnsupportedVersion(2))
        );
    }

    #[test]
    fn validate_checks_framebuffer_geometry() {
        let good = GlcdSnapshot {
            version: SnapshotVersion::V1,
            pins: 0,
            data_latch: 0,
            halves: [ControllerHalf::new(); 2],
            framebuffer: vec![0; FRAMEBUFFER_BYTES].into_boxed_slice(),
        };
        assert_eq!(good.validate(), Ok(()));

        let truncated = GlcdSnapshot {
            framebuffer: vec![0; FRAMEBUFFER_BYTES - 1].into_boxed_slice(),
            ..good
        };
        assert_eq!(
            truncated.validate(),
            Err(SnapshotError::GeometryMismatch {
                expected: FRAMEBUFFER_BYTES,
                actual: FRAMEBUFFER_BYTES - 1,
            })
        );
    }
}
