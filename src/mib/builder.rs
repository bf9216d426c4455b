//! Two-phase construction of a [`MibTree`] from flat definitions.

use std::collections::{HashMap, HashSet, VecDeque};

use super::object::{MibObject, MibObjectDef};
use super::{MibNode, MibTree, NodeId};
use crate::error::{Error, Result, TreeErrorKind};

/// Collects definitions, then wires them into a tree in one pass.
///
/// Children appear in declaration order. A definition may name a parent
/// that is declared later; only parents that never appear are an error.
///
/// ```
/// use mibwalk::mib::{MibObject, MibObjectDef, MibTreeBuilder};
///
/// let mut builder = MibTreeBuilder::with_standard_roots();
/// builder
///     .define(MibObjectDef::under("system", MibObject::new("sysDescr", 1)))
///     .define(MibObjectDef::under("mib-2", MibObject::new("system", 1)));
/// let tree = builder.build().unwrap();
///
/// let descr = tree.find_by_name("sysdescr").unwrap();
/// assert_eq!(tree.path_numbers(descr), vec![1, 3, 6, 1, 2, 1, 1, 1]);
/// ```
#[derive(Debug, Default)]
pub struct MibTreeBuilder {
    defs: Vec<MibObjectDef>,
    names: HashSet<String>,
}

impl MibTreeBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder pre-loaded with the registration arcs every MIB hangs off:
    /// `iso(1).org(3).dod(6).internet(1)` with `directory(1)`, `mgmt(2)`,
    /// `mib-2(1)`, `experimental(3)`, `private(4)` and `enterprises(1)`.
    pub fn with_standard_roots() -> Self {
        let mut builder = Self::new();
        builder
            .define(MibObjectDef::top_level(MibObject::new("iso", 1)))
            .define(MibObjectDef::under("iso", MibObject::new("org", 3)))
            .define(MibObjectDef::under("org", MibObject::new("dod", 6)))
            .define(MibObjectDef::under("dod", MibObject::new("internet", 1)))
            .define(MibObjectDef::under("internet", MibObject::new("directory", 1)))
            .define(MibObjectDef::under("internet", MibObject::new("mgmt", 2)))
            .define(MibObjectDef::under("mgmt", MibObject::new("mib-2", 1)))
            .define(MibObjectDef::under("internet", MibObject::new("experimental", 3)))
            .define(MibObjectDef::under("internet", MibObject::new("private", 4)))
            .define(MibObjectDef::under("private", MibObject::new("enterprises", 1)));
        builder
    }

    /// Record one definition.
    ///
    /// A name that was already defined is ignored.
    pub fn define(&mut self, def: MibObjectDef) -> &mut Self {
        if !self.names.insert(def.object.name.clone()) {
            tracing::debug!(target: "mibwalk::mib", { snmp.mib_name = %def.object.name, snmp.mib_module = %def.object.mib }, "duplicate MIB object ignored");
            return self;
        }
        self.defs.push(def);
        self
    }

    /// Number of recorded definitions.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Wire the definitions into an immutable tree.
    ///
    /// Fails with [`TreeErrorKind::DuplicateSubid`] when two siblings share a
    /// subidentifier and with [`TreeErrorKind::UnresolvedParents`] listing
    /// every definition that could not be attached.
    pub fn build(self) -> Result<MibTree> {
        // parent name -> (declaration index, object), in declaration order
        let mut pending: HashMap<Option<String>, Vec<(usize, MibObject)>> = HashMap::new();
        for (index, def) in self.defs.into_iter().enumerate() {
            pending
                .entry(def.parent)
                .or_default()
                .push((index, def.object));
        }

        let mut nodes = vec![MibNode {
            object: MibObject::new("", 0),
            parent: None,
            children: Vec::new(),
        }];
        let mut queue = VecDeque::from([(NodeId::ROOT, None::<String>)]);

        while let Some((parent_id, parent_key)) = queue.pop_front() {
            let Some(children) = pending.remove(&parent_key) else {
                continue;
            };
            let mut seen = HashSet::with_capacity(children.len());
            for (_, object) in children {
                if !seen.insert(object.subid) {
                    return Err(Error::Tree(TreeErrorKind::DuplicateSubid {
                        parent: parent_key.unwrap_or_default(),
                        subid: object.subid,
                    })
                    .boxed());
                }
                let id = NodeId(nodes.len());
                let name = object.name.clone();
                nodes.push(MibNode {
                    object,
                    parent: Some(parent_id),
                    children: Vec::new(),
                });
                nodes[parent_id.0].children.push(id);
                queue.push_back((id, Some(name)));
            }
        }

        if !pending.is_empty() {
            let mut orphans: Vec<(usize, String, String)> = pending
                .into_iter()
                .flat_map(|(parent, children)| {
                    let parent = parent.unwrap_or_default();
                    children
                        .into_iter()
                        .map(move |(index, object)| (index, object.name, parent.clone()))
                })
                .collect();
            orphans.sort_by_key(|(index, _, _)| *index);
            tracing::warn!(target: "mibwalk::mib", { snmp.orphans = orphans.len() }, "MIB definitions with unresolved parents");
            return Err(Error::Tree(TreeErrorKind::UnresolvedParents(
                orphans
                    .into_iter()
                    .map(|(_, name, parent)| (name, parent))
                    .collect(),
            ))
            .boxed());
        }

        tracing::debug!(target: "mibwalk::mib", { snmp.nodes = nodes.len() - 1 }, "MIB tree built");
        Ok(MibTree { nodes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_keep_declaration_order() {
        let mut builder = MibTreeBuilder::new();
        builder
            .define(MibObjectDef::top_level(MibObject::new("a", 1)))
            .define(MibObjectDef::under("a", MibObject::new("z", 9)))
            .define(MibObjectDef::under("a", MibObject::new("y", 2)));
        let tree = builder.build().unwrap();

        let a = tree.children(tree.root())[0];
        let names: Vec<&str> = tree
            .children(a)
            .iter()
            .map(|&id| tree.node(id).name())
            .collect();
        assert_eq!(names, vec!["z", "y"]);
    }

    #[test]
    fn parent_may_be_declared_later() {
        let mut builder = MibTreeBuilder::new();
        builder
            .define(MibObjectDef::under("top", MibObject::new("leaf", 5)))
            .define(MibObjectDef::top_level(MibObject::new("top", 1)));
        let tree = builder.build().unwrap();
        let leaf = tree.find_by_name("leaf").unwrap();
        assert_eq!(tree.path_names(leaf), vec!["top", "leaf"]);
    }

    #[test]
    fn duplicate_name_keeps_first() {
        let mut builder = MibTreeBuilder::new();
        builder
            .define(MibObjectDef::top_level(MibObject::new("x", 1).mib("FIRST-MIB")))
            .define(MibObjectDef::top_level(MibObject::new("x", 2).mib("SECOND-MIB")));
        assert_eq!(builder.len(), 1);

        let tree = builder.build().unwrap();
        let x = tree.find_by_name("x").unwrap();
        assert_eq!(tree.node(x).object().mib, "FIRST-MIB");
    }

    #[test]
    fn duplicate_subid_is_an_error() {
        let mut builder = MibTreeBuilder::with_standard_roots();
        builder
            .define(MibObjectDef::under("mib-2", MibObject::new("system", 1)))
            .define(MibObjectDef::under("mib-2", MibObject::new("notSystem", 1)));
        let err = builder.build().unwrap_err();
        assert!(matches!(
            *err,
            Error::Tree(TreeErrorKind::DuplicateSubid { ref parent, subid: 1 }) if parent == "mib-2"
        ));
    }

    #[test]
    fn orphans_and_cycles_are_reported() {
        let mut builder = MibTreeBuilder::with_standard_roots();
        builder
            .define(MibObjectDef::under("missing", MibObject::new("lost", 1)))
            .define(MibObjectDef::under("b", MibObject::new("a", 1)))
            .define(MibObjectDef::under("a", MibObject::new("b", 1)));
        let err = builder.build().unwrap_err();
        match *err {
            Error::Tree(TreeErrorKind::UnresolvedParents(ref orphans)) => {
                assert_eq!(
                    orphans,
                    &vec![
                        ("lost".to_string(), "missing".to_string()),
                        ("a".to_string(), "b".to_string()),
                        ("b".to_string(), "a".to_string()),
                    ]
                );
            }
            ref other => panic!("expected UnresolvedParents, got {:?}", other),
        }
    }
}
