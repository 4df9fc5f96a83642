//! Owned MIB trees.
//!
//! A [`MibTree`] is an arena of [`MibNode`]s built by [`parse`] from a tree
//! owned by something else (a MIB loader, a test fixture). Nodes refer to
//! their parent and children by [`NodeId`]; the arena is stored in pre-order,
//! so iteration visits parents before children and siblings in source order.

mod parse;

pub use parse::{ForeignMibNode, parse};

use std::fmt;

use crate::oid::Oid;

/// Index of a node within its [`MibTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    /// Position in pre-order.
    pub const fn to_index(self) -> usize {
        self.0 as usize
    }
}

/// Node kind, numbered like net-snmp's `TYPE_*` constants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MibNodeType {
    /// Internal node with no syntax.
    #[default]
    Other,
    ObjectIdentifier,
    OctetString,
    Integer,
    NetworkAddress,
    IpAddress,
    Counter,
    Gauge,
    TimeTicks,
    Opaque,
    Null,
    Counter64,
    BitString,
    NsapAddress,
    UInteger,
    Unsigned32,
    Integer32,
    TrapType,
    NotificationType,
    ObjectGroup,
    NotificationGroup,
    ModuleIdentity,
    AgentCapabilities,
    ModuleCompliance,
    ObjectIdentity,
    /// Code outside the known set.
    Unknown(i32),
}

impl MibNodeType {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Other,
            1 => Self::ObjectIdentifier,
            2 => Self::OctetString,
            3 => Self::Integer,
            4 => Self::NetworkAddress,
            5 => Self::IpAddress,
            6 => Self::Counter,
            7 => Self::Gauge,
            8 => Self::TimeTicks,
            9 => Self::Opaque,
            10 => Self::Null,
            11 => Self::Counter64,
            12 => Self::BitString,
            13 => Self::NsapAddress,
            14 => Self::UInteger,
            15 => Self::Unsigned32,
            16 => Self::Integer32,
            20 => Self::TrapType,
            21 => Self::NotificationType,
            22 => Self::ObjectGroup,
            23 => Self::NotificationGroup,
            24 => Self::ModuleIdentity,
            25 => Self::AgentCapabilities,
            26 => Self::ModuleCompliance,
            27 => Self::ObjectIdentity,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Other => 0,
            Self::ObjectIdentifier => 1,
            Self::OctetString => 2,
            Self::Integer => 3,
            Self::NetworkAddress => 4,
            Self::IpAddress => 5,
            Self::Counter => 6,
            Self::Gauge => 7,
            Self::TimeTicks => 8,
            Self::Opaque => 9,
            Self::Null => 10,
            Self::Counter64 => 11,
            Self::BitString => 12,
            Self::NsapAddress => 13,
            Self::UInteger => 14,
            Self::Unsigned32 => 15,
            Self::Integer32 => 16,
            Self::TrapType => 20,
            Self::NotificationType => 21,
            Self::ObjectGroup => 22,
            Self::NotificationGroup => 23,
            Self::ModuleIdentity => 24,
            Self::AgentCapabilities => 25,
            Self::ModuleCompliance => 26,
            Self::ObjectIdentity => 27,
            Self::Unknown(code) => code,
        }
    }

    /// Whether nodes of this kind carry a value an agent can return.
    pub fn has_syntax(self) -> bool {
        (1..=16).contains(&self.code())
    }
}

impl fmt::Display for MibNodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Other => "OTHER",
            Self::ObjectIdentifier => "OBJECT IDENTIFIER",
            Self::OctetString => "OCTET STRING",
            Self::Integer => "INTEGER",
            Self::NetworkAddress => "NetworkAddress",
            Self::IpAddress => "IpAddress",
            Self::Counter => "Counter32",
            Self::Gauge => "Gauge32",
            Self::TimeTicks => "TimeTicks",
            Self::Opaque => "Opaque",
            Self::Null => "NULL",
            Self::Counter64 => "Counter64",
            Self::BitString => "BITS",
            Self::NsapAddress => "NsapAddress",
            Self::UInteger => "UInteger32",
            Self::Unsigned32 => "Unsigned32",
            Self::Integer32 => "Integer32",
            Self::TrapType => "TRAP-TYPE",
            Self::NotificationType => "NOTIFICATION-TYPE",
            Self::ObjectGroup => "OBJECT-GROUP",
            Self::NotificationGroup => "NOTIFICATION-GROUP",
            Self::ModuleIdentity => "MODULE-IDENTITY",
            Self::AgentCapabilities => "AGENT-CAPABILITIES",
            Self::ModuleCompliance => "MODULE-COMPLIANCE",
            Self::ObjectIdentity => "OBJECT-IDENTITY",
            Self::Unknown(code) => return write!(f, "TYPE({code})"),
        };
        f.write_str(name)
    }
}

/// A node in a [`MibTree`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MibNode {
    id: NodeId,
    name: String,
    oid_suffix: u32,
    node_type: MibNodeType,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl MibNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The arc this node adds to its parent's OID.
    pub fn oid_suffix(&self) -> u32 {
        self.oid_suffix
    }

    pub fn node_type(&self) -> MibNodeType {
        self.node_type
    }

    /// `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in source order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Owned, queryable MIB tree. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MibTree {
    nodes: Vec<MibNode>,
}

impl MibTree {
    /// Start a tree with its root node.
    pub(crate) fn with_root(name: &str, oid_suffix: u32, node_type: MibNodeType) -> Self {
        Self {
            nodes: vec![MibNode {
                id: NodeId(0),
                name: name.to_owned(),
                oid_suffix,
                node_type,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Append a node under `parent`. Nodes must be added in pre-order.
    ///
    /// Returns `None` if the arena is full or `parent` is not in the tree.
    pub(crate) fn push_child(
        &mut self,
        parent: NodeId,
        name: &str,
        oid_suffix: u32,
        node_type: MibNodeType,
    ) -> Option<NodeId> {
        let id = NodeId::from_index(self.nodes.len())?;
        self.nodes.get_mut(parent.to_index())?.children.push(id);
        self.nodes.push(MibNode {
            id,
            name: name.to_owned(),
            oid_suffix,
            node_type,
            parent: Some(parent),
            children: Vec::new(),
        });
        Some(id)
    }

    pub fn root(&self) -> &MibNode {
        &self.nodes[0]
    }

    pub fn get(&self, id: NodeId) -> Option<&MibNode> {
        self.nodes.get(id.to_index())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent(&self, node: &MibNode) -> Option<&MibNode> {
        node.parent.and_then(|id| self.get(id))
    }

    pub fn children<'a>(&'a self, node: &'a MibNode) -> impl Iterator<Item = &'a MibNode> + 'a {
        node.children.iter().filter_map(|id| self.get(*id))
    }

    /// All nodes in pre-order, starting with the root.
    pub fn iter(&self) -> std::slice::Iter<'_, MibNode> {
        self.nodes.iter()
    }

    /// Visit the subtree under `start` in pre-order until `visitor` returns
    /// `false`. Returns `false` if the walk stopped early.
    pub fn walk<F>(&self, start: NodeId, visitor: &mut F) -> bool
    where
        F: FnMut(&MibNode) -> bool,
    {
        let mut pending = vec![start];
        while let Some(id) = pending.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            if !visitor(node) {
                return false;
            }
            pending.extend(node.children.iter().rev().copied());
        }
        true
    }

    /// Follow `path` down from the root, one arc per level. The root's own
    /// suffix is not part of the path; an empty path yields the root.
    ///
    /// ```
    /// # use snmp_core::mib::{ForeignMibNode, MibNodeType, parse};
    /// # struct Node(&'static str, u32, Vec<Node>);
    /// # impl ForeignMibNode for Node {
    /// #     fn name(&self) -> &str { self.0 }
    /// #     fn oid_suffix(&self) -> u32 { self.1 }
    /// #     fn node_type(&self) -> MibNodeType { MibNodeType::Other }
    /// #     fn children(&self) -> impl Iterator<Item = &Self> { self.2.iter() }
    /// # }
    /// let iso = Node("iso", 1, vec![Node("org", 3, vec![Node("dod", 6, vec![])])]);
    /// let tree = parse(&iso).unwrap();
    ///
    /// assert_eq!(tree.lookup(&[3, 6]).map(|n| n.name()), Some("dod"));
    /// assert!(tree.lookup(&[3, 7]).is_none());
    /// ```
    pub fn lookup(&self, path: &[u32]) -> Option<&MibNode> {
        path.iter().try_fold(self.root(), |node, arc| {
            self.children(node).find(|child| child.oid_suffix == *arc)
        })
    }

    /// Find the node whose full OID (see [`oid_of`](Self::oid_of)) is `oid`.
    pub fn lookup_oid(&self, oid: &Oid) -> Option<&MibNode> {
        let (first, rest) = oid.arcs().split_first()?;
        if *first != self.root().oid_suffix {
            return None;
        }
        self.lookup(rest)
    }

    /// First node named `name`, in pre-order.
    pub fn find(&self, name: &str) -> Option<&MibNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Full OID of `node`: the suffixes from the root down to it.
    pub fn oid_of(&self, node: &MibNode) -> Oid {
        let mut arcs = vec![node.oid_suffix];
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            arcs.push(parent.oid_suffix);
            current = parent;
        }
        arcs.reverse();
        Oid::new(arcs)
    }

    /// Depth of `node` below the root.
    pub fn depth(&self, node: &MibNode) -> usize {
        std::iter::successors(self.parent(node), |n| self.parent(n)).count()
    }
}

impl<'a> IntoIterator for &'a MibTree {
    type Item = &'a MibNode;
    type IntoIter = std::slice::Iter<'a, MibNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
