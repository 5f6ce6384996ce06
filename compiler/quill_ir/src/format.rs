//! Per-node formatting state.
//!
//! Every node and every block carries a [`FormatState`]: one packed `u32`
//! holding the newline count before the node, an alternate newline count
//! (used for the line breaks before a block's closing delimiter) and a set of
//! [`FormatFlags`].
//!
//! # Layout
//!
//! | bits   | meaning                                  |
//! |--------|------------------------------------------|
//! | 0-6    | newline count, clamped to [`MAX_NEWLINES`] |
//! | 7      | `NEWLINES_SET`                           |
//! | 8-14   | alternate newline count                  |
//! | 15     | `END_NEWLINES_SET`                       |
//! | 16-23  | style flags                              |

use std::fmt;

use bitflags::bitflags;

/// Largest newline count a node can record.
pub const MAX_NEWLINES: u8 = 127;

const COUNT_MASK: u32 = 0x7F;
const ALT_SHIFT: u32 = 8;

bitflags! {
    /// Formatting flags stored next to the newline counts.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FormatFlags: u32 {
        // === Explicitness (bits 7, 15) ===

        /// The newline count was derived from source or set by the user.
        const NEWLINES_SET = 1 << 7;
        /// The alternate newline count was derived from source or set by the user.
        const END_NEWLINES_SET = 1 << 15;

        // === Style (bits 16-23) ===

        /// Render at column zero regardless of the current indentation.
        const NO_INDENTATION = 1 << 16;
        /// Node is followed by its `;` terminator.
        const HAS_TERMINATOR = 1 << 17;
        /// `HAS_TERMINATOR` was set explicitly.
        const TERMINATOR_SET = 1 << 18;
        /// Node is wrapped in its grouping delimiters (braces for blocks).
        const HAS_GROUPING = 1 << 19;
        /// `HAS_GROUPING` was set explicitly and must not be normalized.
        const GROUPING_SET = 1 << 20;
        /// Node is a compile-time constant.
        const IS_CONST = 1 << 21;
        /// Node was created by code rather than parsed from source.
        const IS_GENERATED = 1 << 22;
        /// No space before this item where it shares a line with the
        /// previous one: `{}` and `x;}` on blocks, `a();b();` on
        /// statements, `x;//c` on comments.
        const TIGHT = 1 << 23;
    }
}

impl FormatFlags {
    /// Flags a deep clone keeps.
    pub const CLONE_MASK: Self = Self::from_bits_truncate(
        Self::NEWLINES_SET.bits()
            | Self::END_NEWLINES_SET.bits()
            | Self::NO_INDENTATION.bits()
            | Self::HAS_TERMINATOR.bits()
            | Self::TERMINATOR_SET.bits()
            | Self::HAS_GROUPING.bits()
            | Self::GROUPING_SET.bits()
            | Self::IS_CONST.bits()
            | Self::TIGHT.bits(),
    );
}

/// Packed newline counts and flags.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct FormatState(u32);

impl FormatState {
    /// State with `newlines` recorded as explicit.
    pub fn with_newlines(newlines: u32) -> Self {
        let mut state = FormatState::default();
        state.set_newlines(newlines);
        state
    }

    /// Newlines before the node.
    #[inline]
    pub const fn newlines(self) -> u8 {
        (self.0 & COUNT_MASK) as u8
    }

    /// Set the newline count and mark it explicit. Values above
    /// [`MAX_NEWLINES`] are stored as [`MAX_NEWLINES`].
    #[inline]
    pub fn set_newlines(&mut self, newlines: u32) {
        self.store_newlines(newlines);
        self.0 |= FormatFlags::NEWLINES_SET.bits();
    }

    /// Set the newline count without marking it explicit.
    #[inline]
    pub fn set_default_newlines(&mut self, newlines: u32) {
        self.store_newlines(newlines);
    }

    fn store_newlines(&mut self, newlines: u32) {
        self.0 = (self.0 & !COUNT_MASK) | clamp(newlines);
    }

    /// Alternate newline count (before a closing delimiter, or after a
    /// directive in a modifier run).
    #[inline]
    pub const fn end_newlines(self) -> u8 {
        ((self.0 >> ALT_SHIFT) & COUNT_MASK) as u8
    }

    #[inline]
    pub fn set_end_newlines(&mut self, newlines: u32) {
        self.0 = (self.0 & !(COUNT_MASK << ALT_SHIFT)) | (clamp(newlines) << ALT_SHIFT);
        self.0 |= FormatFlags::END_NEWLINES_SET.bits();
    }

    /// True if the node starts on its own line.
    #[inline]
    pub const fn is_first_on_line(self) -> bool {
        self.newlines() > 0
    }

    #[inline]
    pub const fn flags(self) -> FormatFlags {
        FormatFlags::from_bits_truncate(self.0)
    }

    #[inline]
    pub const fn contains(self, flags: FormatFlags) -> bool {
        self.flags().contains(flags)
    }

    #[inline]
    pub fn insert(&mut self, flags: FormatFlags) {
        self.0 |= flags.bits();
    }

    #[inline]
    pub fn remove(&mut self, flags: FormatFlags) {
        self.0 &= !flags.bits();
    }

    #[inline]
    pub fn set(&mut self, flags: FormatFlags, value: bool) {
        if value {
            self.insert(flags);
        } else {
            self.remove(flags);
        }
    }

    /// Swap the newline counts of two states, leaving flags alone.
    pub fn swap_newlines(a: &mut FormatState, b: &mut FormatState) {
        let (na, nb) = (a.newlines(), b.newlines());
        a.store_newlines(u32::from(nb));
        b.store_newlines(u32::from(na));
    }

    /// Copy of this state restricted to the flags a clone keeps.
    #[must_use]
    pub fn for_clone(self) -> FormatState {
        let counts = self.0 & (COUNT_MASK | (COUNT_MASK << ALT_SHIFT));
        FormatState(counts | (self.flags() & FormatFlags::CLONE_MASK).bits())
    }
}

fn clamp(newlines: u32) -> u32 {
    newlines.min(u32::from(MAX_NEWLINES))
}

impl fmt::Debug for FormatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatState")
            .field("newlines", &self.newlines())
            .field("end_newlines", &self.end_newlines())
            .field("flags", &self.flags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newlines_clamp_at_max() {
        let mut state = FormatState::default();
        state.set_newlines(500);
        assert_eq!(state.newlines(), MAX_NEWLINES);
        assert!(state.contains(FormatFlags::NEWLINES_SET));
    }

    #[test]
    fn counts_do_not_leak_into_flags() {
        let mut state = FormatState::with_newlines(127);
        state.set_end_newlines(127);
        state.insert(FormatFlags::HAS_TERMINATOR);
        assert_eq!(state.newlines(), 127);
        assert_eq!(state.end_newlines(), 127);
        assert_eq!(
            state.flags(),
            FormatFlags::NEWLINES_SET | FormatFlags::END_NEWLINES_SET | FormatFlags::HAS_TERMINATOR
        );
    }

    #[test]
    fn default_newlines_are_not_explicit() {
        let mut state = FormatState::default();
        state.set_default_newlines(1);
        assert_eq!(state.newlines(), 1);
        assert!(!state.contains(FormatFlags::NEWLINES_SET));
    }

    #[test]
    fn swap_keeps_flags() {
        let mut a = FormatState::with_newlines(2);
        a.insert(FormatFlags::HAS_TERMINATOR);
        let mut b = FormatState::with_newlines(0);
        FormatState::swap_newlines(&mut a, &mut b);
        assert_eq!(a.newlines(), 0);
        assert_eq!(b.newlines(), 2);
        assert!(a.contains(FormatFlags::HAS_TERMINATOR));
        assert!(!b.contains(FormatFlags::HAS_TERMINATOR));
    }

    #[test]
    fn clone_drops_generated_flag() {
        let mut state = FormatState::with_newlines(1);
        state.insert(FormatFlags::IS_GENERATED | FormatFlags::TIGHT);
        let cloned = state.for_clone();
        assert_eq!(cloned.newlines(), 1);
        assert!(cloned.contains(FormatFlags::TIGHT));
        assert!(!cloned.contains(FormatFlags::IS_GENERATED));
    }
}
