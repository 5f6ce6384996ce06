//! The parser backlog.
//!
//! Items parsed but not yet committed to the tree: comments and directives
//! waiting to learn whether they lead a statement, modifier keywords waiting
//! for their declaration, and fragments that may end up unrecognized.
//!
//! Each block pushes a floor when it starts and pops it when it ends. A
//! block only ever drains entries above its own floor, so a nested block
//! cannot consume (or flush) items that belong to its ancestors.

use quill_ir::NodeId;

/// One backlog item.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Entry {
    /// A node not yet placed (annotation, expression fragment).
    Node(NodeId),
    /// A raw token (modifier keyword or stray token), by cursor index.
    Token(usize),
}

#[derive(Debug, Default)]
pub(crate) struct Backlog {
    entries: Vec<Entry>,
    floors: Vec<usize>,
}

impl Backlog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Start a block: entries below this point are off limits until
    /// [`leave`](Self::leave).
    pub(crate) fn enter(&mut self) {
        self.floors.push(self.entries.len());
    }

    /// End a block. Entries it left pending pass to the enclosing block.
    pub(crate) fn leave(&mut self) {
        self.floors.pop();
    }

    #[inline]
    fn floor(&self) -> usize {
        self.floors.last().copied().unwrap_or(0).min(self.entries.len())
    }

    pub(crate) fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Entries of the current block, oldest first.
    pub(crate) fn pending(&self) -> &[Entry] {
        &self.entries[self.floor()..]
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.pending().is_empty()
    }

    /// Remove and return every entry of the current block.
    pub(crate) fn take_pending(&mut self) -> Vec<Entry> {
        let floor = self.floor();
        self.entries.split_off(floor)
    }

    /// Remove and return the current block's entries from `start` (an
    /// index into [`pending`](Self::pending)) to the end.
    pub(crate) fn take_tail(&mut self, start: usize) -> Vec<Entry> {
        let at = (self.floor() + start).min(self.entries.len());
        self.entries.split_off(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_block_sees_only_its_own_entries() {
        let mut backlog = Backlog::new();
        backlog.enter();
        backlog.push(Entry::Token(1));
        backlog.enter();
        assert!(!backlog.has_pending());
        backlog.push(Entry::Token(2));
        assert_eq!(backlog.pending(), &[Entry::Token(2)]);
        assert_eq!(backlog.take_pending(), vec![Entry::Token(2)]);
        backlog.leave();
        assert_eq!(backlog.pending(), &[Entry::Token(1)]);
    }

    #[test]
    fn entries_left_by_a_block_pass_to_its_parent() {
        let mut backlog = Backlog::new();
        backlog.enter();
        backlog.enter();
        backlog.push(Entry::Token(7));
        backlog.leave();
        assert_eq!(backlog.pending(), &[Entry::Token(7)]);
    }

    #[test]
    fn take_tail_splits_at_pending_index() {
        let mut backlog = Backlog::new();
        backlog.push(Entry::Token(0));
        backlog.enter();
        backlog.push(Entry::Token(1));
        backlog.push(Entry::Token(2));
        assert_eq!(backlog.take_tail(1), vec![Entry::Token(2)]);
        assert_eq!(backlog.pending(), &[Entry::Token(1)]);
    }
}
