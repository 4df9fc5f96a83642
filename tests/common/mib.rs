//! Foreign MIB tree fixture.

use snmp_core::{ForeignMibNode, MibNodeType};

/// Owned foreign node, standing in for a MIB loader's tree.
#[derive(Debug, Clone)]
pub struct FixtureNode {
    pub name: String,
    pub suffix: u32,
    pub node_type: MibNodeType,
    pub children: Vec<FixtureNode>,
}

impl FixtureNode {
    pub fn new(name: &str, suffix: u32, node_type: MibNodeType) -> Self {
        Self {
            name: name.to_owned(),
            suffix,
            node_type,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<FixtureNode>) -> Self {
        self.children = children;
        self
    }

    pub fn count(&self) -> usize {
        1 + self.children.iter().map(FixtureNode::count).sum::<usize>()
    }

    /// Nodes in pre-order.
    pub fn preorder(&self) -> Vec<&FixtureNode> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.preorder());
        }
        out
    }
}

impl ForeignMibNode for FixtureNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn oid_suffix(&self) -> u32 {
        self.suffix
    }

    fn node_type(&self) -> MibNodeType {
        self.node_type
    }

    fn children(&self) -> impl Iterator<Item = &Self> {
        self.children.iter()
    }
}

/// iso.org.dod.internet with mgmt.mib-2.{system, interfaces} and private.
pub fn internet_tree() -> FixtureNode {
    use MibNodeType::*;

    let system = FixtureNode::new("system", 1, Other).with_children(vec![
        FixtureNode::new("sysDescr", 1, OctetString),
        FixtureNode::new("sysObjectID", 2, ObjectIdentifier),
        FixtureNode::new("sysUpTime", 3, TimeTicks),
        FixtureNode::new("sysContact", 4, OctetString),
        FixtureNode::new("sysName", 5, OctetString),
    ]);
    let if_entry = FixtureNode::new("ifEntry", 1, Other).with_children(vec![
        FixtureNode::new("ifIndex", 1, Integer32),
        FixtureNode::new("ifDescr", 2, OctetString),
        FixtureNode::new("ifInOctets", 10, Counter),
    ]);
    let interfaces = FixtureNode::new("interfaces", 2, Other).with_children(vec![
        FixtureNode::new("ifNumber", 1, Integer32),
        FixtureNode::new("ifTable", 2, Other).with_children(vec![if_entry]),
    ]);
    let mib2 = FixtureNode::new("mib-2", 1, ModuleIdentity).with_children(vec![system, interfaces]);

    FixtureNode::new("iso", 1, Other).with_children(vec![
        FixtureNode::new("org", 3, Other).with_children(vec![
            FixtureNode::new("dod", 6, Other).with_children(vec![
                FixtureNode::new("internet", 1, Other).with_children(vec![
                    FixtureNode::new("mgmt", 2, Other).with_children(vec![mib2]),
                    FixtureNode::new("private", 4, Other).with_children(vec![
                        FixtureNode::new("enterprises", 1, Other),
                    ]),
                ]),
            ]),
        ]),
    ])
}
