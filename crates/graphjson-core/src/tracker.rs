//! Encode pass 1: identity discovery and encoder-tree construction.
//!
//! One depth-first walk over the value graph builds a [`Node`] per visited
//! value and fills an [`IdentityTable`] at the same time. Nothing is written
//! here. When an instance turns up a second time its entry is flagged shared
//! and the walk emits a [`NodeKind::Reference`] without descending again. The
//! serializer reads the flag from the finished table, so a first occurrence
//! built before the repeat was seen still gets its defining envelope.
//!
//! Entries are keyed by the address of the instance's allocation. A recurrence
//! of one instance is trivially structurally equal to it, so the address alone
//! identifies the bucket, and two equal but distinct instances stay separate
//! entries. Lookup is constant time regardless of how many equal values the
//! graph holds.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CoderError, Result};
use crate::registry::TypeRegistry;
use crate::value::{TypedArray, Value};

/// Text at or below this many characters is never shared.
pub const SHARING_THRESHOLD: usize = 20;

#[derive(Debug)]
pub(crate) struct IdentityEntry {
    id: u64,
    shared: bool,
}

enum Visit {
    First(usize),
    Repeat(u64),
}

/// Tracked instances in visit order, indexed by address, for one encode call.
#[derive(Debug, Default)]
pub(crate) struct IdentityTable {
    by_address: HashMap<usize, usize>,
    entries: Vec<IdentityEntry>,
}

impl IdentityTable {
    fn visit(&mut self, address: usize) -> Visit {
        if let Some(&index) = self.by_address.get(&address) {
            let entry = &mut self.entries[index];
            entry.shared = true;
            return Visit::Repeat(entry.id);
        }
        let index = self.entries.len();
        self.entries.push(IdentityEntry {
            id: index as u64 + 1,
            shared: false,
        });
        self.by_address.insert(address, index);
        Visit::First(index)
    }

    pub(crate) fn is_shared(&self, index: usize) -> bool {
        self.entries[index].shared
    }

    pub(crate) fn id(&self, index: usize) -> u64 {
        self.entries[index].id
    }

    pub(crate) fn tracked(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn shared(&self) -> usize {
        self.entries.iter().filter(|e| e.shared).count()
    }
}

/// One visited value. `entry` points into the identity table for values that
/// take part in identity tracking.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) entry: Option<usize>,
    pub(crate) kind: NodeKind,
}

#[derive(Debug)]
pub(crate) enum NodeKind {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(Arc<str>),
    Sequence(Vec<Node>),
    Mapping(Vec<(String, Node)>),
    Extension {
        type_name: Arc<str>,
        representation: Box<Node>,
    },
    Array {
        item_type: String,
        /// Canonical identifier of `item_type`. Items tagged with exactly this
        /// identifier may be written without their tag.
        canonical: Arc<str>,
        items: Vec<Node>,
    },
    Reference(u64),
}

impl Node {
    fn untracked(kind: NodeKind) -> Self {
        Self { entry: None, kind }
    }
}

/// Result of pass 1.
#[derive(Debug)]
pub(crate) struct EncoderTree {
    pub(crate) root: Node,
    pub(crate) table: IdentityTable,
    pub(crate) references: usize,
}

/// Walk `root` once and build its encoder tree.
pub(crate) fn build(registry: &TypeRegistry, root: &Value) -> Result<EncoderTree> {
    let mut tracker = GraphTracker {
        registry,
        table: IdentityTable::default(),
        retained: Vec::new(),
        references: 0,
    };
    let root = tracker.record(root, true)?;
    Ok(EncoderTree {
        root,
        table: tracker.table,
        references: tracker.references,
    })
}

struct GraphTracker<'r> {
    registry: &'r TypeRegistry,
    table: IdentityTable,
    /// Adaptor representations stay alive until the walk ends so that their
    /// allocations cannot be reused under an address the table already holds.
    retained: Vec<Value>,
    references: usize,
}

impl GraphTracker<'_> {
    fn record(&mut self, value: &Value, track: bool) -> Result<Node> {
        let entry = match tracked_address(value).filter(|_| track) {
            Some(address) => match self.table.visit(address) {
                Visit::First(index) => Some(index),
                Visit::Repeat(id) => {
                    self.references += 1;
                    return Ok(Node::untracked(NodeKind::Reference(id)));
                }
            },
            None => None,
        };

        let kind = match value {
            Value::Null => NodeKind::Null,
            Value::Bool(b) => NodeKind::Bool(*b),
            Value::Int(i) => NodeKind::Int(*i),
            Value::Float(f) if !f.is_finite() => return Err(CoderError::NonFiniteFloat(*f)),
            Value::Float(f) => NodeKind::Float(*f),
            Value::Text(text) => NodeKind::Text(Arc::clone(text)),
            Value::Sequence(items) => NodeKind::Sequence(self.record_all(items)?),
            Value::Mapping(map) => {
                let mut fields = Vec::with_capacity(map.len());
                for (key, item) in map.iter() {
                    fields.push((key.clone(), self.record(item, true)?));
                }
                NodeKind::Mapping(fields)
            }
            Value::Extension(ext) => {
                let registered = self.registry.require(ext.type_name())?;
                let representation = registered
                    .adaptor()
                    .represent(ext.type_name(), ext.native())?;
                // The extension's own entry already stands for the representation root.
                let node = self.record(&representation, false)?;
                self.retained.push(representation);
                NodeKind::Extension {
                    type_name: Arc::from(ext.type_name()),
                    representation: Box::new(node),
                }
            }
            Value::Array(array) => {
                let canonical = self.check_items(array)?;
                NodeKind::Array {
                    item_type: array.item_type().to_string(),
                    canonical,
                    items: self.record_all(array.items())?,
                }
            }
        };
        Ok(Node { entry, kind })
    }

    fn record_all(&mut self, items: &[Value]) -> Result<Vec<Node>> {
        items.iter().map(|item| self.record(item, true)).collect()
    }

    /// Verify every item against the declared type and return its canonical
    /// identifier.
    fn check_items(&self, array: &TypedArray) -> Result<Arc<str>> {
        let declared = self
            .registry
            .canonical_type(array.item_type())
            .ok_or_else(|| CoderError::UnregisteredType {
                type_name: array.item_type().to_string(),
            })?;
        for item in array.items() {
            if item.is_null() {
                continue;
            }
            let found = self.registry.canonical_type(item.type_name());
            if found != Some(declared) {
                return Err(CoderError::ItemTypeMismatch {
                    item_type: array.item_type().to_string(),
                    found: item.type_name().to_string(),
                });
            }
        }
        Ok(Arc::from(declared))
    }
}

/// Address used for identity tracking, or `None` for values that never share.
fn tracked_address(value: &Value) -> Option<usize> {
    match value {
        Value::Text(text) if text.chars().count() <= SHARING_THRESHOLD => None,
        other => other.address(),
    }
}
