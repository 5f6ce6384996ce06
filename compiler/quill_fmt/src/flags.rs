//! Render flags.

use bitflags::bitflags;

bitflags! {
    /// Options for one render call.
    ///
    /// Pass-through flags apply to the whole subtree; local flags only to
    /// the node handed to [`render_node`](crate::render_node).
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct RenderFlags: u8 {
        // === Pass-through ===

        /// Record each node's output position.
        const UPDATE_POSITION = 1 << 0;
        /// One-line summary: block bodies become `{ ... }`, inactive
        /// source and comments are left out.
        const DESCRIPTION = 1 << 1;

        // === Local ===

        /// Ignore the line breaks before the node.
        const SUPPRESS_NEWLINES = 1 << 4;
        /// Leave out the node's end-of-line comments.
        const NO_EOL_COMMENTS = 1 << 5;
        /// Leave out the node's leading annotations.
        const NO_PREFIX = 1 << 6;
    }
}

impl RenderFlags {
    /// Flags forwarded to children.
    pub const PASS_THROUGH: Self =
        Self::from_bits_truncate(Self::UPDATE_POSITION.bits() | Self::DESCRIPTION.bits());

    /// The subset a child render receives.
    #[inline]
    #[must_use]
    pub fn for_children(self) -> Self {
        self & Self::PASS_THROUGH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_flags_stop_at_the_node() {
        let flags = RenderFlags::DESCRIPTION | RenderFlags::NO_PREFIX | RenderFlags::SUPPRESS_NEWLINES;
        assert_eq!(flags.for_children(), RenderFlags::DESCRIPTION);
    }
}
