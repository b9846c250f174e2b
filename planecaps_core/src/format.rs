// Copyright 2026 the Planecaps Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel format normalization.
//!
//! Channels report raw device format codes ([`Fourcc`]). The composition
//! planner works on normalized [`PixelFormat`] codes. A [`FormatTranslator`]
//! maps one to the other; one raw code may expand to several normalized
//! codes, and a code the translator does not know is skipped by the resolver.

use alloc::vec::Vec;
use core::fmt;

use crate::channel::Fourcc;

/// A normalized pixel format code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PixelFormat(pub u32);

impl fmt::Debug for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PixelFormat({:#x})", self.0)
    }
}

/// A raw format code had no normalized equivalent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnsupportedFormat(pub Fourcc);

impl fmt::Display for UnsupportedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no normalized format for {:?}", self.0)
    }
}

impl core::error::Error for UnsupportedFormat {}

/// Translates raw device format codes to normalized codes.
pub trait FormatTranslator {
    /// Returns the normalized codes for `code`, in preference order.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFormat`] if `code` has no normalized equivalent.
    fn translate(&self, code: Fourcc) -> Result<Vec<PixelFormat>, UnsupportedFormat>;
}

impl<T: FormatTranslator + ?Sized> FormatTranslator for &T {
    fn translate(&self, code: Fourcc) -> Result<Vec<PixelFormat>, UnsupportedFormat> {
        (**self).translate(code)
    }
}

/// A table-driven [`FormatTranslator`].
///
/// Each raw code maps to a fixed list of normalized codes. Lookups are linear;
/// device format lists are short.
#[derive(Clone, Debug, Default)]
pub struct FormatTable {
    entries: Vec<(Fourcc, Vec<PixelFormat>)>,
}

impl FormatTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mapping, replacing any previous mapping for `code`.
    #[must_use]
    pub fn with(mut self, code: Fourcc, formats: &[PixelFormat]) -> Self {
        self.insert(code, formats);
        self
    }

    /// Adds a mapping, replacing any previous mapping for `code`.
    pub fn insert(&mut self, code: Fourcc, formats: &[PixelFormat]) {
        match self.entries.iter_mut().find(|(c, _)| *c == code) {
            Some((_, existing)) => {
                existing.clear();
                existing.extend_from_slice(formats);
            }
            None => self.entries.push((code, formats.to_vec())),
        }
    }

    /// Returns the number of mapped raw codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FormatTranslator for FormatTable {
    fn translate(&self, code: Fourcc) -> Result<Vec<PixelFormat>, UnsupportedFormat> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, formats)| formats.clone())
            .ok_or(UnsupportedFormat(code))
    }
}

/// Deduplicated, insertion-ordered list of normalized formats.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct FormatList {
    formats: Vec<PixelFormat>,
}

impl FormatList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// Appends `format` unless already present. Returns `true` if it was
    /// added.
    pub fn insert(&mut self, format: PixelFormat) -> bool {
        if self.formats.contains(&format) {
            return false;
        }
        self.formats.push(format);
        true
    }

    /// Appends every format of `other` not already present, preserving
    /// `other`'s order.
    pub fn extend_from(&mut self, other: &Self) {
        for &format in other.iter() {
            self.insert(format);
        }
    }

    /// Returns `true` if `format` is in the list.
    #[must_use]
    pub fn contains(&self, format: PixelFormat) -> bool {
        self.formats.contains(&format)
    }

    /// Iterates formats in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, PixelFormat> {
        self.formats.iter()
    }

    /// Returns the formats as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[PixelFormat] {
        &self.formats
    }

    /// Returns the number of formats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// Returns `true` when the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

impl fmt::Debug for FormatList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.formats.iter()).finish()
    }
}

impl FromIterator<PixelFormat> for FormatList {
    fn from_iter<I: IntoIterator<Item = PixelFormat>>(iter: I) -> Self {
        let mut list = Self::new();
        for format in iter {
            list.insert(format);
        }
        list
    }
}

impl<'a> IntoIterator for &'a FormatList {
    type Item = &'a PixelFormat;
    type IntoIter = core::slice::Iter<'a, PixelFormat>;

    fn into_iter(self) -> Self::IntoIter {
        self.formats.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XR24: Fourcc = Fourcc::from_chars(*b"XR24");
    const NV12: Fourcc = Fourcc::from_chars(*b"NV12");

    #[test]
    fn format_list_drops_duplicates_and_keeps_order() {
        let list: FormatList = [PixelFormat(5), PixelFormat(1), PixelFormat(5), PixelFormat(3)]
            .into_iter()
            .collect();
        assert_eq!(
            list.as_slice(),
            &[PixelFormat(5), PixelFormat(1), PixelFormat(3)]
        );
    }

    #[test]
    fn format_list_extend_skips_known_formats() {
        let mut a: FormatList = [PixelFormat(1), PixelFormat(2)].into_iter().collect();
        let b: FormatList = [PixelFormat(2), PixelFormat(7)].into_iter().collect();
        a.extend_from(&b);
        assert_eq!(
            a.as_slice(),
            &[PixelFormat(1), PixelFormat(2), PixelFormat(7)]
        );
        assert!(a.contains(PixelFormat(7)));
        assert!(!a.insert(PixelFormat(1)));
    }

    #[test]
    fn format_table_translates_known_codes() {
        let table = FormatTable::new()
            .with(XR24, &[PixelFormat(2), PixelFormat(5)])
            .with(NV12, &[PixelFormat(0x11)]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.translate(XR24),
            Ok(alloc::vec![PixelFormat(2), PixelFormat(5)])
        );
        assert_eq!(
            table.translate(Fourcc::from_chars(*b"AB30")),
            Err(UnsupportedFormat(Fourcc::from_chars(*b"AB30")))
        );
    }

    #[test]
    fn format_table_insert_replaces_mapping() {
        let mut table = FormatTable::new().with(XR24, &[PixelFormat(2)]);
        table.insert(XR24, &[]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.translate(XR24), Ok(alloc::vec![]));
    }
}
