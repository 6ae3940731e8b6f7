//! Indexed element trees.
//!
//! An [`Element`] is a chunk plus derived attributes and its indexed
//! children. Trees are built once by the indexer and read-only afterwards;
//! the only mutation offered is whole-subtree replacement, used when a
//! consumer re-attaches a filtered child list.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write;

use crate::chunk::Chunk;
use crate::fourcc::FourCC;

/// An attribute value attached to an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    /// Unsigned integer attribute (offsets, sizes, counters).
    UInt(u64),
    /// Text attribute (generated ids, reconstructed paths).
    Text(String),
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::UInt(v) => write!(f, "{}", v),
            Attribute::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One node of an indexed chunk tree.
#[derive(Debug, Clone)]
pub struct Element<'a> {
    /// The underlying chunk.
    pub chunk: Chunk<'a>,
    /// Derived attributes: always `offset` and `size`, plus whatever the
    /// indexing hook injected.
    pub attribs: BTreeMap<String, Attribute>,
    /// Indexed children, in archive order.
    pub children: Vec<Element<'a>>,
}

impl<'a> Element<'a> {
    /// Create a leaf element with the standard offset/size attributes.
    pub fn new(chunk: Chunk<'a>) -> Self {
        let mut attribs = BTreeMap::new();
        attribs.insert("offset".to_string(), Attribute::UInt(chunk.offset()));
        attribs.insert("size".to_string(), Attribute::UInt(chunk.len() as u64));
        Element {
            chunk,
            attribs,
            children: Vec::new(),
        }
    }

    /// Element tag.
    pub fn tag(&self) -> FourCC {
        self.chunk.tag()
    }

    /// Look up an attribute.
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attribs.get(name)
    }

    /// Replace this element's whole child list.
    pub fn replace_children(&mut self, children: Vec<Element<'a>>) {
        self.children = children;
    }

    /// Greatest nesting depth below this element; 0 for a leaf.
    pub fn depth(&self) -> u32 {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Resolve a slash-separated tag path against this element's subtree.
    ///
    /// Ambiguous segments resolve to the first match in archive order.
    pub fn find(&self, path: &str) -> Option<&Element<'a>> {
        let mut current = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let want = FourCC::from_str(segment)?;
            current = current.children.iter().find(|c| c.tag() == want)?;
        }
        Some(current)
    }

    /// Indented textual dump of this subtree.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.render(&mut out, 0);
        out
    }

    fn render(&self, out: &mut String, indent: usize) {
        let pad = "    ".repeat(indent);
        let attrs = self
            .attribs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(out, "{}{} [{}]", pad, self.tag(), attrs);
        if self.children.is_empty() {
            let _ = writeln!(out);
        } else {
            let _ = writeln!(out, " ({} children)", self.children.len());
        }
        for child in &self.children {
            child.render(out, indent + 1);
        }
    }
}

/// Resolve a slash-separated tag path against a forest of root elements.
///
/// The first segment selects a root; the rest descend. Ambiguous matches
/// resolve to the first element in construction order.
pub fn find_path<'e, 'a>(roots: &'e [Element<'a>], path: &str) -> Option<&'e Element<'a>> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let first = FourCC::from_str(segments.next()?)?;
    let root = roots.iter().find(|e| e.tag() == first)?;
    let rest: Vec<&str> = segments.collect();
    if rest.is_empty() {
        Some(root)
    } else {
        root.find(&rest.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tag: &[u8; 4], offset: u64, body: &'static [u8]) -> Element<'static> {
        Element::new(Chunk::new(FourCC::new(*tag), offset, body))
    }

    fn sample_tree() -> Element<'static> {
        let mut root = leaf(b"LECF", 0, &[0; 64]);
        let mut lflf = leaf(b"LFLF", 8, &[0; 32]);
        lflf.children.push(leaf(b"ROOM", 16, &[1, 2]));
        lflf.children.push(leaf(b"SOUN", 26, &[3]));
        lflf.children.push(leaf(b"ROOM", 35, &[4, 5, 6]));
        root.children.push(lflf);
        root
    }

    #[test]
    fn test_standard_attribs() {
        let element = leaf(b"ROOM", 24, &[0; 10]);
        assert_eq!(element.attr("offset"), Some(&Attribute::UInt(24)));
        assert_eq!(element.attr("size"), Some(&Attribute::UInt(10)));
    }

    #[test]
    fn test_find_first_match() {
        let root = sample_tree();
        let room = root.find("LFLF/ROOM").unwrap();
        assert_eq!(room.attr("offset"), Some(&Attribute::UInt(16)));
    }

    #[test]
    fn test_find_missing() {
        let root = sample_tree();
        assert!(root.find("LFLF/COST").is_none());
    }

    #[test]
    fn test_find_path_forest() {
        let roots = vec![sample_tree()];
        let soun = find_path(&roots, "LECF/LFLF/SOUN").unwrap();
        assert_eq!(soun.attr("offset"), Some(&Attribute::UInt(26)));
        assert!(find_path(&roots, "LECF").is_some());
        assert!(find_path(&roots, "MISS").is_none());
    }

    #[test]
    fn test_depth() {
        let root = sample_tree();
        assert_eq!(root.depth(), 2);
        assert_eq!(leaf(b"ROOM", 0, &[]).depth(), 0);
    }

    #[test]
    fn test_dump_shape() {
        let root = sample_tree();
        let dump = root.dump();
        let lines: Vec<&str> = dump.lines().collect();
        assert!(lines[0].starts_with("LECF [offset=0 size=64] (1 children)"));
        assert!(lines[1].starts_with("    LFLF"));
        assert!(lines[2].starts_with("        ROOM [offset=16 size=2]"));
    }
}
