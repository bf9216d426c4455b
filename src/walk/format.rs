//! Rendering walk results through the OID tree.

use crate::config::STRIP_PREFIXES;
use crate::mib::{MibTree, NodeId};
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;

use super::WalkResult;

/// Display form of a response OID.
///
/// The nearest tree node's name path replaces the arcs it covers and any
/// remaining arcs follow numerically. Then the first [`STRIP_PREFIXES`]
/// entry found is cut off along with everything before it. An OID with no
/// matching node is shown numerically.
///
/// ```
/// use mibwalk::mib::{MibObject, MibObjectDef, MibTreeBuilder};
/// use mibwalk::{oid, walk::display_oid};
///
/// let mut builder = MibTreeBuilder::with_standard_roots();
/// builder
///     .define(MibObjectDef::under("mib-2", MibObject::new("system", 1)))
///     .define(MibObjectDef::under("system", MibObject::new("sysDescr", 1)));
/// let tree = builder.build().unwrap();
///
/// assert_eq!(display_oid(&tree, &oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)), "system.sysDescr.0");
/// assert_eq!(display_oid(&tree, &oid!(2, 5, 4)), "2.5.4");
/// ```
pub fn display_oid(tree: &MibTree, oid: &Oid) -> String {
    match tree.find_nearest(oid) {
        Some(node) => display_oid_at(tree, node, oid),
        None => oid.to_string(),
    }
}

fn display_oid_at(tree: &MibTree, node: NodeId, oid: &Oid) -> String {
    let node_arcs = tree.path_numbers(node);
    // Only substitute when the node's numeric path really is a prefix.
    let Some(suffix) = oid.arcs().strip_prefix(node_arcs.as_slice()) else {
        return oid.to_string();
    };

    let mut display = tree.path_names(node).join(".");
    for arc in suffix {
        display.push('.');
        display.push_str(&arc.to_string());
    }

    for prefix in STRIP_PREFIXES {
        if let Some(pos) = display.find(prefix) {
            return display[pos + prefix.len()..].to_string();
        }
    }
    display
}

/// Display form of a value, with enumeration labels substituted.
///
/// Only INTEGER values are looked up, and only in the syntax of `node`.
pub fn display_value(tree: &MibTree, node: Option<NodeId>, value: &Value) -> String {
    if let (Some(node), Value::Integer(n)) = (node, value)
        && let Some(label) = tree.node(node).object().syntax.label_for(n)
    {
        return label.to_string();
    }
    value.to_string()
}

impl WalkResult {
    /// Format one response binding.
    pub fn from_varbind(tree: &MibTree, vb: &VarBind) -> Self {
        let node = tree.find_nearest(&vb.oid);
        let display_oid = match node {
            Some(node) => display_oid_at(tree, node, &vb.oid),
            None => vb.oid.to_string(),
        };
        WalkResult {
            display_oid,
            numeric_oid: vb.oid.clone(),
            value: display_value(tree, node, &vb.value),
        }
    }
}
