//! Tree reconstruction and flattening.
//!
//! Chunks are stored in pre-order and the declared child count is the only
//! structural signal: a node with count `C` owns the next `C` complete
//! subtrees. [`build`] turns that flat sequence into nested maps, keying each
//! child by its kind name; [`flatten`] is the inverse.
//!
//! Array-record kinds hold a list of records instead of a map. Such a child is
//! stored directly under its key (replacing, not appending) and always counts
//! as a single child of its parent.

use surfride_common::TypeTag;

use crate::dictionary::Dictionary;
use crate::kind::unescape_tag;
use crate::value::{Map, Value};
use crate::{Error, Result};

/// One node of the pre-order sequence: its own properties, without children.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatNode {
    pub tag: TypeTag,
    pub child_count: u16,
    /// A property map, or a list of record maps for array-record kinds.
    pub value: Value,
}

impl FlatNode {
    pub fn new(tag: TypeTag, child_count: u16, value: Value) -> Self {
        Self {
            tag,
            child_count,
            value,
        }
    }
}

/// Open parent on the build stack.
struct Frame {
    index: usize,
    remaining: u16,
}

/// Rebuild the nested tree from a pre-order node sequence.
///
/// Returns the root value. Each child ends up under its parent's map, keyed by
/// [`Dictionary::key_for`].
pub fn build(nodes: Vec<FlatNode>, dict: &Dictionary) -> Result<Value> {
    if nodes.is_empty() {
        return Err(Error::InvalidTree("no nodes to build from".into()));
    }

    // Pass 1: link every node to its parent using an explicit stack
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut stack: Vec<Frame> = Vec::new();

    for (index, node) in nodes.iter().enumerate() {
        if index > 0 {
            let frame = stack.last_mut().ok_or_else(|| Error::UnbalancedChildCount {
                index,
                reason: "every earlier node already has all of its declared children".into(),
            })?;
            children[frame.index].push(index);
            frame.remaining -= 1;
            if frame.remaining == 0 {
                stack.pop();
            }
        }

        if node.child_count > 0 {
            if dict.layouts.is_record_list(node.tag) {
                return Err(Error::ChildrenOnRecordList {
                    index,
                    tag: node.tag,
                    child_count: node.child_count,
                });
            }
            stack.push(Frame {
                index,
                remaining: node.child_count,
            });
        }
    }

    if let Some(frame) = stack.last() {
        return Err(Error::UnbalancedChildCount {
            index: frame.index,
            reason: format!(
                "{} of {} declared children are missing",
                frame.remaining, nodes[frame.index].child_count
            ),
        });
    }

    // Pass 2: children always come after their parent, so assembling in
    // reverse order finishes every subtree before it is attached
    let tags: Vec<TypeTag> = nodes.iter().map(|n| n.tag).collect();
    let mut slots: Vec<Option<Value>> = nodes.into_iter().map(|n| Some(n.value)).collect();

    for index in (0..slots.len()).rev() {
        if children[index].is_empty() {
            continue;
        }
        let mut value = slots[index].take().unwrap_or_default();
        let map = match &mut value {
            Value::Map(map) => map,
            other => {
                return Err(Error::InvalidTree(format!(
                    "{} node {} has children but is a {}",
                    tags[index],
                    index,
                    other.type_name()
                )))
            }
        };
        for &child in &children[index] {
            let child_value = slots[child].take().unwrap_or_default();
            attach(map, tags[child], child_value, dict)?;
        }
        slots[index] = Some(value);
    }

    Ok(slots[0].take().unwrap_or_default())
}

fn attach(parent: &mut Map, tag: TypeTag, child: Value, dict: &Dictionary) -> Result<()> {
    let key = dict.key_for(tag);

    if dict.layouts.is_record_list(tag) {
        parent.insert(key.into_owned(), child);
        return Ok(());
    }

    match parent.get_mut(&key) {
        Some(Value::List(items)) => items.push(child),
        Some(_) => {
            return Err(Error::InvalidTree(format!(
                "child key {:?} collides with a property",
                key
            )))
        }
        None => {
            parent.insert(key.into_owned(), Value::List(vec![child]));
        }
    }
    Ok(())
}

/// Flatten a tree back into its pre-order node sequence.
///
/// A key is a child key if it names a known kind, if it is an escaped tag, or
/// if it is a four-byte tag holding a list and is not a known property name.
/// Everything else stays on the node as a property.
pub fn flatten(root: &Value, root_tag: TypeTag, dict: &Dictionary) -> Result<Vec<FlatNode>> {
    let mut out = Vec::new();
    let mut pending: Vec<(TypeTag, &Value)> = vec![(root_tag, root)];

    while let Some((tag, value)) = pending.pop() {
        if dict.layouts.is_record_list(tag) {
            out.push(FlatNode::new(tag, 0, value.clone()));
            continue;
        }

        let map = value.as_map().ok_or_else(|| {
            Error::InvalidTree(format!(
                "{} node must be a map, got {}",
                dict.key_for(tag),
                value.type_name()
            ))
        })?;

        let mut properties = Map::new();
        let mut subtrees: Vec<(TypeTag, &Value)> = Vec::new();

        for (key, entry) in map.iter() {
            let Some(child_tag) = child_tag(key, entry, dict) else {
                properties.insert(key, entry.clone());
                continue;
            };

            if dict.layouts.is_record_list(child_tag) {
                subtrees.push((child_tag, entry));
                continue;
            }

            let items = entry.as_list().ok_or_else(|| {
                Error::InvalidTree(format!(
                    "children under {:?} must be a list, got {}",
                    key,
                    entry.type_name()
                ))
            })?;
            subtrees.extend(items.iter().map(|item| (child_tag, item)));
        }

        let child_count = u16::try_from(subtrees.len()).map_err(|_| Error::CountOverflow {
            what: "child",
            count: subtrees.len(),
            limit: u16::MAX as usize,
        })?;

        out.push(FlatNode::new(tag, child_count, Value::Map(properties)));

        // Reversed so the first child is popped first
        pending.extend(subtrees.into_iter().rev());
    }

    Ok(out)
}

fn child_tag(key: &str, value: &Value, dict: &Dictionary) -> Option<TypeTag> {
    if let Some(tag) = dict.kinds.tag(key).or_else(|| unescape_tag(key)) {
        return Some(tag);
    }
    if dict.properties.by_name(key).is_some() || !value.is_list() {
        return None;
    }
    key.parse().ok()
}

/// A decoded scene: the root node's kind and its nested value.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub tag: TypeTag,
    pub root: Value,
}

impl Tree {
    /// Build from a pre-order node sequence; the first node is the root.
    pub fn from_nodes(nodes: Vec<FlatNode>, dict: &Dictionary) -> Result<Self> {
        let tag = nodes
            .first()
            .map(|n| n.tag)
            .ok_or_else(|| Error::InvalidTree("no nodes to build from".into()))?;
        let root = build(nodes, dict)?;
        Ok(Self { tag, root })
    }

    /// Pre-order node sequence of this tree.
    pub fn to_nodes(&self, dict: &Dictionary) -> Result<Vec<FlatNode>> {
        flatten(&self.root, self.tag, dict)
    }

    /// Wrap the root in a single-entry map keyed by its kind name.
    pub fn to_value(&self, dict: &Dictionary) -> Value {
        let mut map = Map::with_capacity(1);
        map.insert(dict.key_for(self.tag).into_owned(), self.root.clone());
        Value::Map(map)
    }

    /// Inverse of [`Tree::to_value`].
    pub fn from_value(value: Value, dict: &Dictionary) -> Result<Self> {
        let map = match value {
            Value::Map(map) => map,
            other => {
                return Err(Error::InvalidTree(format!(
                    "document must be a map, got {}",
                    other.type_name()
                )))
            }
        };
        if map.len() != 1 {
            return Err(Error::InvalidTree(format!(
                "document must hold exactly one root, found {} keys",
                map.len()
            )));
        }

        let Some((key, root)) = map.into_iter().next() else {
            return Err(Error::InvalidTree("document is empty".into()));
        };
        let tag = dict
            .tag_for_key(&key)
            .ok_or_else(|| Error::InvalidTree(format!("unknown root kind {:?}", key)))?;

        Ok(Self { tag, root })
    }
}
