//! Per-block name dictionaries.
//!
//! Maps a name to the declarations that use it. A name with one owner is
//! stored inline; a second owner promotes the entry to an [`AmbiguityGroup`],
//! and removals demote it again. `goto` targets share the map under a
//! [`GOTO_PREFIX`]ed key so they never collide with declarations.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::node_id::NodeId;

/// Key prefix for `goto` labels.
pub const GOTO_PREFIX: char = ':';

/// Handle to a symbol that lives outside the tree (supplied by a host).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExternalSymbol(u32);

impl ExternalSymbol {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        ExternalSymbol(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Something a name resolves to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Symbol {
    Node(NodeId),
    External(ExternalSymbol),
}

/// Two or more symbols sharing a name (overloads, partial declarations).
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct AmbiguityGroup {
    members: SmallVec<[Symbol; 2]>,
}

impl AmbiguityGroup {
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.members.iter().copied()
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.members.contains(&symbol)
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
enum Entry {
    Single(Symbol),
    Group(AmbiguityGroup),
}

/// Result of a name lookup.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Lookup<'a> {
    None,
    Single(Symbol),
    Group(&'a AmbiguityGroup),
}

impl Lookup<'_> {
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Lookup::None)
    }

    /// The symbol if the name is unambiguous.
    pub fn single(&self) -> Option<Symbol> {
        match self {
            Lookup::Single(s) => Some(*s),
            _ => None,
        }
    }
}

/// Name to symbol map of one block.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct NameDictionary {
    map: FxHashMap<Box<str>, Entry>,
}

impl NameDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct names.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Register `symbol` under `name`. Adding the same symbol twice is a no-op.
    pub fn add(&mut self, name: &str, symbol: Symbol) {
        match self.map.get_mut(name) {
            None => {
                self.map.insert(name.into(), Entry::Single(symbol));
            }
            Some(entry) => match entry {
                Entry::Single(existing) => {
                    if *existing != symbol {
                        let mut members = SmallVec::new();
                        members.push(*existing);
                        members.push(symbol);
                        tracing::trace!(name, "name dictionary: promoted to ambiguity group");
                        *entry = Entry::Group(AmbiguityGroup { members });
                    }
                }
                Entry::Group(group) => {
                    if !group.contains(symbol) {
                        group.members.push(symbol);
                    }
                }
            },
        }
    }

    /// Remove `symbol` from `name`. Returns whether it was registered.
    pub fn remove(&mut self, name: &str, symbol: Symbol) -> bool {
        let Some(entry) = self.map.get_mut(name) else {
            return false;
        };
        match entry {
            Entry::Single(existing) => {
                if *existing != symbol {
                    return false;
                }
                self.map.remove(name);
                true
            }
            Entry::Group(group) => {
                let Some(index) = group.members.iter().position(|&s| s == symbol) else {
                    return false;
                };
                group.members.remove(index);
                match group.members.len() {
                    0 => {
                        self.map.remove(name);
                    }
                    1 => {
                        let last = group.members[0];
                        *entry = Entry::Single(last);
                    }
                    _ => {}
                }
                true
            }
        }
    }

    pub fn find(&self, name: &str) -> Lookup<'_> {
        match self.map.get(name) {
            None => Lookup::None,
            Some(Entry::Single(s)) => Lookup::Single(*s),
            Some(Entry::Group(g)) => Lookup::Group(g),
        }
    }

    pub fn add_goto_target(&mut self, label: &str, symbol: Symbol) {
        self.add(&goto_key(label), symbol);
    }

    pub fn remove_goto_target(&mut self, label: &str, symbol: Symbol) -> bool {
        self.remove(&goto_key(label), symbol)
    }

    pub fn find_goto_target(&self, label: &str) -> Lookup<'_> {
        self.find(&goto_key(label))
    }

    /// Names in arbitrary order, goto keys included.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(|k| &**k)
    }
}

fn goto_key(label: &str) -> String {
    let mut key = String::with_capacity(label.len() + 1);
    key.push(GOTO_PREFIX);
    key.push_str(label);
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node(i: u32) -> Symbol {
        Symbol::Node(NodeId::new(i))
    }

    #[test]
    fn second_symbol_promotes_to_group() {
        let mut dict = NameDictionary::new();
        dict.add("Run", node(1));
        assert_eq!(dict.find("Run"), Lookup::Single(node(1)));

        dict.add("Run", node(2));
        match dict.find("Run") {
            Lookup::Group(group) => {
                assert_eq!(group.len(), 2);
                assert!(group.contains(node(1)));
                assert!(group.contains(node(2)));
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn removal_demotes_group() {
        let mut dict = NameDictionary::new();
        dict.add("Run", node(1));
        dict.add("Run", node(2));
        assert!(dict.remove("Run", node(1)));
        assert_eq!(dict.find("Run"), Lookup::Single(node(2)));
        assert!(dict.remove("Run", node(2)));
        assert!(dict.find("Run").is_none());
        assert!(dict.is_empty());
    }

    #[test]
    fn removing_unknown_symbol_is_refused() {
        let mut dict = NameDictionary::new();
        dict.add("x", node(1));
        assert!(!dict.remove("x", node(9)));
        assert!(!dict.remove("y", node(1)));
        assert_eq!(dict.find("x"), Lookup::Single(node(1)));
    }

    #[test]
    fn duplicate_add_is_ignored() {
        let mut dict = NameDictionary::new();
        dict.add("x", node(1));
        dict.add("x", node(1));
        assert_eq!(dict.find("x"), Lookup::Single(node(1)));
    }

    #[test]
    fn goto_targets_do_not_collide_with_names() {
        let mut dict = NameDictionary::new();
        dict.add("done", node(1));
        dict.add_goto_target("done", node(2));
        assert_eq!(dict.find("done"), Lookup::Single(node(1)));
        assert_eq!(dict.find_goto_target("done"), Lookup::Single(node(2)));
        assert!(dict.remove_goto_target("done", node(2)));
        assert!(dict.find_goto_target("done").is_none());
    }

    #[test]
    fn external_symbols_mix_with_nodes() {
        let mut dict = NameDictionary::new();
        let ext = Symbol::External(ExternalSymbol::new(7));
        dict.add("Console", ext);
        dict.add("Console", node(3));
        assert!(matches!(dict.find("Console"), Lookup::Group(g) if g.contains(ext)));
    }
}
