// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolution failure reasons.

use core::fmt;

use crate::blob::BlobError;
use crate::channel::{BlobId, ChannelId};
use crate::derived::DerivedError;
use crate::format::UnsupportedFormat;

/// Why a step of restriction resolution failed.
///
/// Every variant except [`FormatTranslationFailed`](Self::FormatTranslationFailed)
/// invalidates the whole table. None of them is returned to the planner as a
/// fault; they are recorded on the table for observability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveError {
    /// The channel declares no capability blob.
    ChannelDataMissing {
        /// Channel without a blob.
        channel: ChannelId,
    },
    /// The channel's blob id is set but the device returned nothing for it.
    BlobRetrievalFailed {
        /// Channel whose blob could not be fetched.
        channel: ChannelId,
        /// Requested blob.
        blob: BlobId,
    },
    /// The blob was fetched but does not fit the fixed layout.
    BlobMalformed {
        /// Channel whose blob is malformed.
        channel: ChannelId,
        /// Offending blob.
        blob: BlobId,
        /// Decoder error.
        error: BlobError,
    },
    /// A raw format code could not be translated. The format is skipped.
    FormatTranslationFailed {
        /// Channel reporting the format.
        channel: ChannelId,
        /// Translator error.
        error: UnsupportedFormat,
    },
    /// A post-processing pass rejected the collected records.
    DerivedTableBuildFailed(DerivedError),
}

impl ResolveError {
    /// Returns `true` if this failure invalidates the table.
    #[must_use]
    pub const fn invalidates_table(&self) -> bool {
        !matches!(self, Self::FormatTranslationFailed { .. })
    }

    /// Returns the channel the failure is attributed to, if any.
    #[must_use]
    pub const fn channel(&self) -> Option<ChannelId> {
        match self {
            Self::ChannelDataMissing { channel }
            | Self::BlobRetrievalFailed { channel, .. }
            | Self::BlobMalformed { channel, .. }
            | Self::FormatTranslationFailed { channel, .. } => Some(*channel),
            Self::DerivedTableBuildFailed(_) => None,
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelDataMissing { channel } => {
                write!(f, "{channel} has no hw restriction information")
            }
            Self::BlobRetrievalFailed { channel, blob } => {
                write!(f, "{channel}: failed to get blob {}", blob.0)
            }
            Self::BlobMalformed {
                channel,
                blob,
                error,
            } => write!(f, "{channel}: blob {} is malformed: {error}", blob.0),
            Self::FormatTranslationFailed { channel, error } => {
                write!(f, "{channel}: {error}")
            }
            Self::DerivedTableBuildFailed(error) => {
                write!(f, "derived table build failed: {error}")
            }
        }
    }
}

impl core::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::BlobMalformed { error, .. } => Some(error),
            Self::FormatTranslationFailed { error, .. } => Some(error),
            Self::DerivedTableBuildFailed(error) => Some(error),
            Self::ChannelDataMissing { .. } | Self::BlobRetrievalFailed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Fourcc;
    use alloc::string::ToString;

    #[test]
    fn only_format_failures_keep_the_table() {
        let skipped = ResolveError::FormatTranslationFailed {
            channel: ChannelId(0),
            error: UnsupportedFormat(Fourcc(7)),
        };
        assert!(!skipped.invalidates_table());
        assert!(ResolveError::ChannelDataMissing { channel: ChannelId(1) }.invalidates_table());
        assert!(
            ResolveError::DerivedTableBuildFailed(DerivedError::DuplicateChannelId {
                hw_id: 0,
                first: ChannelId(0),
                second: ChannelId(1),
            })
            .invalidates_table()
        );
    }

    #[test]
    fn display_names_the_channel() {
        let err = ResolveError::BlobRetrievalFailed {
            channel: ChannelId(2),
            blob: BlobId(41),
        };
        assert_eq!(err.to_string(), "channel 2: failed to get blob 41");
        assert_eq!(err.channel(), Some(ChannelId(2)));
    }
}
