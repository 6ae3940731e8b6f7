//! Schema-driven recursive indexing.
//!
//! The indexer turns a chunk stream into an [`Element`] tree, consulting a
//! [`Schema`] to decide which tags recurse and validating every parent/child
//! relationship on the way down.
//!
//! Two modes:
//! - **lenient** (default): schema violations are logged and the offending
//!   chunk becomes a non-recursing leaf;
//! - **strict**: violations come back as structured
//!   [`ContainerError::MissingSchemaKey`] / [`MissingSchemaEntry`] values.
//!   Schema inference drives the strict mode and pattern-matches on them.
//!
//! Structural failures inside a child payload are fatal in both modes and
//! are wrapped as [`ContainerError::SubchunkScan`] naming the parent.
//!
//! [`MissingSchemaEntry`]: ContainerError::MissingSchemaEntry

use std::collections::BTreeSet;

use tracing::warn;

use crate::chunk::Chunk;
use crate::element::{Attribute, Element};
use crate::error::{ContainerError, Result};
use crate::fourcc::FourCC;
use crate::schema::Schema;
use crate::stream::{ChunkScanner, ScanConfig};

/// Attribute hook invoked for every indexed chunk.
///
/// Must be a pure function of the parent element, the chunk, and its offset;
/// the returned pairs are merged into the element's attribute map.
pub type AttribHook<'h> =
    &'h dyn Fn(Option<&Element<'_>>, &Chunk<'_>, u64) -> Vec<(String, Attribute)>;

/// Recursive element-tree indexer.
pub struct Indexer<'s, 'h> {
    schema: &'s Schema,
    config: ScanConfig,
    strict: bool,
    max_depth: Option<u32>,
    speculative: Option<&'s BTreeSet<FourCC>>,
    hook: Option<AttribHook<'h>>,
}

impl<'s, 'h> Indexer<'s, 'h> {
    /// Create a lenient indexer with unbounded depth.
    pub fn new(schema: &'s Schema, config: ScanConfig) -> Self {
        Indexer {
            schema,
            config,
            strict: false,
            max_depth: None,
            speculative: None,
            hook: None,
        }
    }

    /// Toggle strict mode.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Bound the recursion depth; `None` is unbounded, `Some(0)` indexes the
    /// top level only.
    pub fn max_depth(mut self, depth: Option<u32>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Tags whose empty child set should still be descended speculatively.
    ///
    /// Inference support: a speculative descent that fails structurally is
    /// reported as [`ContainerError::SubchunkScan`] so the caller can mark
    /// the tag as a data leaf instead.
    pub fn speculative(mut self, tags: &'s BTreeSet<FourCC>) -> Self {
        self.speculative = Some(tags);
        self
    }

    /// Install an attribute hook.
    pub fn hook(mut self, hook: AttribHook<'h>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Index a buffer into a forest of elements.
    ///
    /// `parent_tag` names the enclosing chunk when `buf` is a payload rather
    /// than a whole archive; it scopes the schema validation of the top
    /// level.
    pub fn index<'a>(&self, buf: &'a [u8], parent_tag: Option<FourCC>) -> Result<Vec<Element<'a>>> {
        self.index_level(buf, 0, parent_tag, None, self.max_depth)
    }

    fn should_descend(&self, tag: FourCC) -> bool {
        match self.schema.children(tag) {
            Some(children) if !children.is_empty() => true,
            Some(_) => self.speculative.is_some_and(|s| s.contains(&tag)),
            None => false,
        }
    }

    fn index_level<'a>(
        &self,
        buf: &'a [u8],
        base_offset: u64,
        parent_tag: Option<FourCC>,
        parent: Option<&Element<'_>>,
        depth_left: Option<u32>,
    ) -> Result<Vec<Element<'a>>> {
        let mut elements = Vec::new();

        for item in ChunkScanner::with_base_offset(buf, self.config, base_offset) {
            let (offset, chunk) = item?;
            let tag = chunk.tag();

            let mut known = true;
            if !self.schema.contains(tag) {
                if self.strict {
                    return Err(ContainerError::MissingSchemaKey { tag });
                }
                warn!(%tag, offset, "tag has no schema entry, treating as leaf");
                known = false;
            }

            if let Some(parent_tag) = parent_tag {
                let allowed = self
                    .schema
                    .children(parent_tag)
                    .is_some_and(|children| children.contains(&tag));
                if !allowed {
                    if self.strict {
                        return Err(ContainerError::MissingSchemaEntry {
                            parent: parent_tag,
                            tag,
                        });
                    }
                    warn!(
                        %tag,
                        parent = %parent_tag,
                        offset,
                        "tag not allowed under parent, treating as leaf"
                    );
                    known = false;
                }
            }

            let mut element = Element::new(chunk);
            if let Some(hook) = self.hook {
                for (key, value) in hook(parent, &chunk, offset) {
                    element.attribs.insert(key, value);
                }
            }

            let descend = known
                && depth_left != Some(0)
                && self.should_descend(tag);
            if descend {
                let body_offset = offset + self.config.codec.header_len() as u64;
                let children = self
                    .index_level(
                        chunk.slice(),
                        body_offset,
                        Some(tag),
                        Some(&element),
                        depth_left.map(|d| d - 1),
                    )
                    .map_err(|err| wrap_child_error(err, tag, offset))?;
                element.replace_children(children);
            }

            elements.push(element);
        }

        Ok(elements)
    }
}

/// Schema violations and already-wrapped scan failures propagate untouched;
/// any other failure inside a child payload gets the parent's identity
/// attached.
fn wrap_child_error(err: ContainerError, parent: FourCC, offset: u64) -> ContainerError {
    match err {
        ContainerError::MissingSchemaKey { .. }
        | ContainerError::MissingSchemaEntry { .. }
        | ContainerError::SubchunkScan { .. }
        | ContainerError::SchemaUnresolvable { .. } => err,
        other => ContainerError::SubchunkScan {
            parent,
            offset,
            source: Box::new(other),
        },
    }
}
