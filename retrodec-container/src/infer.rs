//! Schema inference by speculative re-parsing.
//!
//! When no schema is known for an archive, the engine discovers one: run the
//! strict indexer over one more depth level each round, and react to the
//! structured errors it returns.
//!
//! - `MissingSchemaKey { tag }` — the tag gets a speculative leaf entry;
//!   later rounds descend into it to see whether it is really a container.
//! - `MissingSchemaEntry { parent, tag }` — the child is added to the
//!   parent's allowed set.
//! - `SubchunkScan { parent }` — the parent's payload is not a chunk
//!   stream after all. Entries this run created are provisional, so such a
//!   parent reverts to a frozen data leaf; a parent the caller's seed
//!   schema declared a container is a hard failure instead. Reverting
//!   matters because binary payloads regularly *start* like a chunk stream
//!   and fall apart a few records in.
//! - anything else — the archive cannot be schematised under the active
//!   configuration.
//!
//! Every reaction adds an entry, adds an edge, or freezes one tag for good,
//! so the loop is bounded by tag cardinality times nesting depth. The
//! returned schema is pruned to the tags of the final successful pass:
//! phantom tags scraped out of data payloads do not survive.

use std::collections::BTreeSet;

use tracing::debug;

use crate::element::Element;
use crate::error::{ContainerError, Result};
use crate::fourcc::FourCC;
use crate::index::Indexer;
use crate::schema::Schema;
use crate::stream::ScanConfig;

/// Discover the nesting schema of `buf`.
///
/// `seed` carries any relationships already known; pass `Schema::new()` to
/// start from nothing. The returned schema indexes `buf` with no
/// violations.
pub fn infer_schema(buf: &[u8], config: ScanConfig, seed: Schema) -> Result<Schema> {
    let seed_tags: BTreeSet<FourCC> = seed.tags().collect();
    let mut schema = seed;
    let mut speculative: BTreeSet<FourCC> = BTreeSet::new();
    let mut provisional: BTreeSet<FourCC> = BTreeSet::new();
    let mut frozen: BTreeSet<FourCC> = BTreeSet::new();
    let mut depth: u32 = 1;

    loop {
        let attempt = Indexer::new(&schema, config)
            .strict(true)
            .max_depth(Some(depth))
            .speculative(&speculative)
            .index(buf, None);

        match attempt {
            Ok(roots) => {
                let deepest = roots.iter().map(|e| e.depth() + 1).max().unwrap_or(0);
                if deepest < depth {
                    let mut keep = seed_tags;
                    collect_tags(&roots, &mut keep);
                    schema.prune(&keep);
                    debug!(entries = schema.len(), depth, "schema inference converged");
                    return Ok(schema);
                }
                depth += 1;
            }
            Err(ContainerError::MissingSchemaKey { tag }) => {
                debug!(%tag, "new tag, speculating leaf");
                if !schema.declare_leaf(tag) {
                    return Err(ContainerError::SchemaUnresolvable { parent: tag });
                }
                speculative.insert(tag);
                provisional.insert(tag);
            }
            Err(ContainerError::MissingSchemaEntry { parent, tag }) => {
                debug!(%parent, %tag, "new child relationship");
                if frozen.contains(&parent) || !schema.allow_child(parent, tag) {
                    return Err(ContainerError::SchemaUnresolvable { parent });
                }
                speculative.remove(&parent);
                if schema.declare_leaf(tag) {
                    speculative.insert(tag);
                    provisional.insert(tag);
                }
            }
            Err(ContainerError::SubchunkScan { parent, .. }) => {
                if provisional.contains(&parent) && !frozen.contains(&parent) {
                    debug!(%parent, "payload is not a chunk stream, reverting to data leaf");
                    schema.clear_children(parent);
                    speculative.remove(&parent);
                    frozen.insert(parent);
                } else {
                    return Err(ContainerError::SchemaUnresolvable { parent });
                }
            }
            Err(other) => return Err(other),
        }
    }
}

fn collect_tags(elements: &[Element<'_>], tags: &mut BTreeSet<FourCC>) {
    for element in elements {
        tags.insert(element.tag());
        collect_tags(&element.children, tags);
    }
}
