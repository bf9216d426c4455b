//! OID tree: MIB object names and metadata indexed by subidentifier.
//!
//! The tree is an arena of [`MibNode`]s addressed by [`NodeId`]. It is built
//! once by [`MibTreeBuilder`] and is read-only afterwards, so it can be
//! shared as `Arc<MibTree>` between walks.
//!
//! Lookups:
//! - [`MibTree::find_by_oid`] descends by dotted numeric text, exact or nearest
//! - [`MibTree::find_by_name`] searches breadth-first, ignoring case
//! - [`MibTree::resolve_oid`] turns `system.sysDescr.0`-style text into an [`Oid`]

mod builder;
mod object;

pub use builder::MibTreeBuilder;
pub use object::{Access, MibObject, MibObjectDef, MibSyntax, Status, ValueLabel};

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::oid::Oid;

/// Handle to a node of one [`MibTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    const ROOT: NodeId = NodeId(0);
}

/// How [`MibTree::find_by_oid`] treats a partial match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Only a node whose numeric path is the whole input.
    #[default]
    Exact,
    /// The deepest node matched along the way.
    Nearest,
}

/// One tree node.
#[derive(Debug, Clone)]
pub struct MibNode {
    object: MibObject,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl MibNode {
    pub fn name(&self) -> &str {
        &self.object.name
    }

    pub fn subid(&self) -> u32 {
        self.object.subid
    }

    pub fn object(&self) -> &MibObject {
        &self.object
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Immutable OID tree with a synthetic root.
///
/// The root has no name or subidentifier of its own and never appears in
/// paths.
#[derive(Debug, Clone)]
pub struct MibTree {
    nodes: Vec<MibNode>,
}

impl MibTree {
    /// The synthetic root.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` came from a different tree and is out of range.
    pub fn node(&self, id: NodeId) -> &MibNode {
        &self.nodes[id.0]
    }

    /// Children of `id` in declaration order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Parent of `id`; `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Number of nodes, not counting the root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nodes from the top level down to `id`, root excluded.
    fn lineage(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if node == NodeId::ROOT {
                break;
            }
            path.push(node);
            current = self.parent(node);
        }
        path.reverse();
        path
    }

    /// Subidentifiers from the top level down to `id`.
    pub fn path_numbers(&self, id: NodeId) -> Vec<u32> {
        self.lineage(id)
            .into_iter()
            .map(|n| self.node(n).subid())
            .collect()
    }

    /// Names from the top level down to `id`.
    pub fn path_names(&self, id: NodeId) -> Vec<&str> {
        self.lineage(id)
            .into_iter()
            .map(|n| self.node(n).name())
            .collect()
    }

    /// Numeric OID of `id`.
    pub fn oid(&self, id: NodeId) -> Oid {
        Oid::new(self.path_numbers(id))
    }

    /// Dotted numeric and dotted name paths of `id`, e.g.
    /// `("1.3.6.1.2.1.1", "iso.org.dod.internet.mgmt.mib-2.system")`.
    pub fn oid_paths(&self, id: NodeId) -> (String, String) {
        (self.oid(id).to_string(), self.path_names(id).join("."))
    }

    /// Find a node by dotted numeric OID text, starting at the root.
    ///
    /// ```
    /// use mibwalk::mib::{MatchPolicy, MibObject, MibObjectDef, MibTreeBuilder};
    ///
    /// let mut builder = MibTreeBuilder::with_standard_roots();
    /// builder
    ///     .define(MibObjectDef::under("mib-2", MibObject::new("system", 1)))
    ///     .define(MibObjectDef::under("system", MibObject::new("sysDescr", 1)));
    /// let tree = builder.build().unwrap();
    ///
    /// let exact = tree.find_by_oid("1.3.6.1.2.1.1.1.0", MatchPolicy::Exact).unwrap();
    /// assert!(exact.is_none());
    ///
    /// let nearest = tree.find_by_oid("1.3.6.1.2.1.1.1.0", MatchPolicy::Nearest).unwrap();
    /// assert_eq!(tree.node(nearest.unwrap()).name(), "sysDescr");
    ///
    /// assert!(tree.find_by_oid("1.3.x", MatchPolicy::Nearest).is_err());
    /// ```
    pub fn find_by_oid(&self, oid: &str, policy: MatchPolicy) -> Result<Option<NodeId>> {
        self.find_by_oid_from(NodeId::ROOT, oid, policy)
    }

    /// Like [`find_by_oid`](Self::find_by_oid), descending from `start`.
    ///
    /// Every component is validated before the descent starts; an empty or
    /// non-numeric component fails with [`Error::InvalidOid`]. An exact match
    /// requires the matched subidentifiers, joined with dots, to reproduce
    /// `oid` verbatim.
    pub fn find_by_oid_from(
        &self,
        start: NodeId,
        oid: &str,
        policy: MatchPolicy,
    ) -> Result<Option<NodeId>> {
        let arcs = oid
            .split('.')
            .map(|part| part.parse::<u32>().map_err(|_| Error::invalid_oid(oid)))
            .collect::<Result<Vec<u32>>>()?;

        let (found, matched) = self.descend(start, &arcs);
        if matched == 0 {
            return Ok(None);
        }

        match policy {
            MatchPolicy::Nearest => Ok(found),
            MatchPolicy::Exact => {
                let verbatim = matched == arcs.len()
                    && arcs
                        .iter()
                        .map(u32::to_string)
                        .collect::<Vec<_>>()
                        .join(".")
                        == oid;
                Ok(found.filter(|_| verbatim))
            }
        }
    }

    /// Deepest node reached by following `arcs` from `start`, with the number
    /// of arcs consumed.
    fn descend(&self, start: NodeId, arcs: &[u32]) -> (Option<NodeId>, usize) {
        let mut current = start;
        let mut found = None;
        let mut matched = 0;
        for &arc in arcs {
            let Some(child) = self.child_by(current, |c| c.subid() == arc) else {
                break;
            };
            current = child;
            found = Some(child);
            matched += 1;
        }
        (found, matched)
    }

    /// Deepest node on the path of a numeric OID.
    ///
    /// Same as [`find_by_oid`](Self::find_by_oid) with
    /// [`MatchPolicy::Nearest`], without the text round trip.
    pub fn find_nearest(&self, oid: &Oid) -> Option<NodeId> {
        self.descend(NodeId::ROOT, oid.arcs()).0
    }

    /// Breadth-first search for a node whose name matches, ignoring ASCII case.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.find_by_name_from(NodeId::ROOT, name)
    }

    /// Breadth-first search below `start` (inclusive, root excepted).
    pub fn find_by_name_from(&self, start: NodeId, name: &str) -> Option<NodeId> {
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            if id != NodeId::ROOT && self.node(id).name().eq_ignore_ascii_case(name) {
                return Some(id);
            }
            queue.extend(self.children(id).iter().copied());
        }
        None
    }

    /// Turn dotted numeric or dotted name text into a numeric OID.
    ///
    /// Leading and trailing dots are ignored. A leading name is found
    /// anywhere in the tree with [`find_by_name`](Self::find_by_name); later
    /// components are numeric arcs or names of children of the node reached
    /// so far. Numbers may continue past the tree (instance suffixes).
    ///
    /// ```
    /// use mibwalk::mib::{MibObject, MibObjectDef, MibTreeBuilder};
    /// use mibwalk::oid;
    ///
    /// let mut builder = MibTreeBuilder::with_standard_roots();
    /// builder.define(MibObjectDef::under("mib-2", MibObject::new("system", 1)));
    /// let tree = builder.build().unwrap();
    ///
    /// assert_eq!(tree.resolve_oid("system.3.0").unwrap(), oid!(1, 3, 6, 1, 2, 1, 1, 3, 0));
    /// assert_eq!(tree.resolve_oid(".1.3.6.1.").unwrap(), oid!(1, 3, 6, 1));
    /// assert_eq!(tree.resolve_oid("iso.org.dod").unwrap(), oid!(1, 3, 6));
    /// assert!(tree.resolve_oid("nosuchname").is_err());
    /// ```
    pub fn resolve_oid(&self, text: &str) -> Result<Oid> {
        let trimmed = text.trim().trim_matches('.');
        if trimmed.is_empty() {
            return Err(Error::invalid_oid(text));
        }

        let mut parts = trimmed.split('.').peekable();
        let (mut arcs, mut current) = match parts.peek().copied() {
            Some(first) if first.parse::<u32>().is_err() => {
                let id = self
                    .find_by_name(first)
                    .ok_or_else(|| Error::invalid_oid(text))?;
                parts.next();
                (self.path_numbers(id), Some(id))
            }
            _ => (Vec::new(), Some(NodeId::ROOT)),
        };

        // `current` becomes None once the numbers leave the tree.
        for part in parts {
            if let Ok(arc) = part.parse::<u32>() {
                arcs.push(arc);
                current = current.and_then(|id| self.child_by(id, |c| c.subid() == arc));
                continue;
            }

            let child = current
                .and_then(|id| self.child_by(id, |c| c.name().eq_ignore_ascii_case(part)))
                .ok_or_else(|| Error::invalid_oid(text))?;
            arcs.push(self.node(child).subid());
            current = Some(child);
        }
        Ok(Oid::new(arcs))
    }

    fn child_by(&self, id: NodeId, pred: impl Fn(&MibNode) -> bool) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| pred(self.node(c)))
    }
}
