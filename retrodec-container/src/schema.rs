//! Nesting schemas.
//!
//! A schema maps each known tag to the set of tags allowed as its children.
//! A tag mapped to the empty set is a leaf. Tags absent from the map are
//! unknown and must be declared or inferred before indexing can descend.
//!
//! Schemas interchange as JSON objects keyed by tag, which keeps the files
//! human-editable:
//!
//! ```json
//! { "LECF": ["LFLF"], "LFLF": ["ROOM", "SOUN"], "ROOM": [], "SOUN": [] }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fourcc::FourCC;

/// Parent-to-children tag mapping for one archive family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    map: BTreeMap<FourCC, BTreeSet<FourCC>>,
}

impl Schema {
    /// Empty schema (every tag unknown).
    pub fn new() -> Self {
        Schema::default()
    }

    /// Build from explicit `(parent, children)` pairs.
    pub fn from_entries<I, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (FourCC, C)>,
        C: IntoIterator<Item = FourCC>,
    {
        let map = entries
            .into_iter()
            .map(|(parent, children)| (parent, children.into_iter().collect()))
            .collect();
        Schema { map }
    }

    /// True when the tag has an entry, leaf or container.
    pub fn contains(&self, tag: FourCC) -> bool {
        self.map.contains_key(&tag)
    }

    /// The allowed child set of a tag, if it has an entry.
    pub fn children(&self, tag: FourCC) -> Option<&BTreeSet<FourCC>> {
        self.map.get(&tag)
    }

    /// True when the tag has an entry with no children.
    pub fn is_leaf(&self, tag: FourCC) -> bool {
        self.children(tag).is_some_and(BTreeSet::is_empty)
    }

    /// Add a leaf entry for a tag; returns false if it already had one.
    pub fn declare_leaf(&mut self, tag: FourCC) -> bool {
        match self.map.entry(tag) {
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(BTreeSet::new());
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Allow `child` under `parent`; returns false if already allowed.
    pub fn allow_child(&mut self, parent: FourCC, child: FourCC) -> bool {
        self.map.entry(parent).or_default().insert(child)
    }

    /// Demote a tag to a childless leaf, keeping its entry.
    pub fn clear_children(&mut self, tag: FourCC) {
        if let Some(children) = self.map.get_mut(&tag) {
            children.clear();
        }
    }

    /// Drop every entry outside `keep`, and every child reference to a
    /// dropped tag.
    pub fn prune(&mut self, keep: &std::collections::BTreeSet<FourCC>) {
        self.map.retain(|tag, _| keep.contains(tag));
        let known: std::collections::BTreeSet<FourCC> = self.map.keys().copied().collect();
        for children in self.map.values_mut() {
            children.retain(|child| known.contains(child));
        }
    }

    /// All known tags.
    pub fn tags(&self) -> impl Iterator<Item = FourCC> + '_ {
        self.map.keys().copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when no tag is known.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Parse a schema document.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Render the schema as a pretty-printed document.
    pub fn to_json(&self) -> String {
        // The map serialises to a plain string-keyed object.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Load a schema document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Write the schema document to a writer.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        Ok(serde_json::to_writer_pretty(writer, self)?)
    }
}
