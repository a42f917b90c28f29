//! Domain entities: core data structures

use std::fmt;

use crate::domain::dn::{domain_from_dn, first_rdn_value};

/// Text appended to the name of an object that closes a nesting cycle.
pub const CIRCULAR_NESTING_MARKER: &str = "- Circular Nesting!";

/// Sequential node identifier; the root is always `NodeId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Link from a node to the node that discovered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    /// Sentinel for the initial node.
    Root,
    Node(NodeId),
}

impl ParentRef {
    pub fn node(self) -> Option<NodeId> {
        match self {
            ParentRef::Root => None,
            ParentRef::Node(id) => Some(id),
        }
    }
}

/// Kind of directory object, derived from its `objectCategory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Group,
    User,
    Computer,
    Other,
}

impl ObjectType {
    /// Classify by the first RDN of the category DN
    /// (`CN=Group,CN=Schema,...` → `Group`). Bare class names are accepted too.
    pub fn from_category(category: &str) -> Self {
        let class = first_rdn_value(category).unwrap_or_else(|_| category.trim().to_string());
        match class.to_ascii_lowercase().as_str() {
            "group" => ObjectType::Group,
            "person" | "user" => ObjectType::User,
            "computer" => ObjectType::Computer,
            _ => ObjectType::Other,
        }
    }

    pub fn is_group(self) -> bool {
        self == ObjectType::Group
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectType::Group => "group",
            ObjectType::User => "user",
            ObjectType::Computer => "computer",
            ObjectType::Other => "other",
        };
        f.write_str(s)
    }
}

/// Expansion state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalState {
    /// Waiting in the work queue.
    Pending,
    /// Children/parents have been fetched.
    Queried,
    /// Closes a nesting cycle; never expanded.
    Skipped,
    /// Nothing to expand (non-group in `Downward`, no memberships in `Upward`).
    NotApplicable,
}

/// Orientation of the membership traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Expand a group's members.
    Downward,
    /// Expand the groups an object belongs to.
    Upward,
}

impl Direction {
    /// Whether a node of this type gets queried in this direction.
    pub fn expands(self, object_type: ObjectType) -> bool {
        match self {
            Direction::Downward => object_type.is_group(),
            Direction::Upward => true,
        }
    }
}

/// Raw object as returned by a directory lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub name: String,
    pub sam_account_name: String,
    pub distinguished_name: String,
    /// Canonical lowercase hyphenated GUID
    pub object_guid: String,
    pub object_category: String,
}

/// One directory object placed in the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub sam_account_name: String,
    pub distinguished_name: String,
    /// Dotted DNS domain derived from the DN
    pub domain: String,
    pub guid: String,
    pub object_type: ObjectType,
    pub parent: ParentRef,
    pub state: TraversalState,
    pub rendered: bool,
}

impl Node {
    pub fn from_record(id: NodeId, parent: ParentRef, record: ObjectRecord) -> Self {
        let domain = domain_from_dn(&record.distinguished_name);
        Self {
            id,
            name: record.name,
            sam_account_name: record.sam_account_name,
            domain,
            distinguished_name: record.distinguished_name,
            guid: record.object_guid,
            object_type: ObjectType::from_category(&record.object_category),
            parent,
            state: TraversalState::Pending,
            rendered: false,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent == ParentRef::Root
    }

    /// Flag this node as closing a cycle: append the marker and stop expansion.
    pub fn mark_circular(&mut self) {
        self.name = format!("{} {}", self.name, CIRCULAR_NESTING_MARKER);
        self.state = TraversalState::Skipped;
    }

    pub fn is_circular(&self) -> bool {
        self.state == TraversalState::Skipped
    }

    /// Name without the circular-nesting marker added by [`Node::mark_circular`].
    pub fn base_name(&self) -> &str {
        if !self.is_circular() {
            return &self.name;
        }
        self.name
            .strip_suffix(CIRCULAR_NESTING_MARKER)
            .map(str::trim_end)
            .unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(name: &str, category: &str) -> ObjectRecord {
        ObjectRecord {
            name: name.to_string(),
            sam_account_name: name.to_lowercase(),
            distinguished_name: format!("CN={},OU=Groups,DC=ad,DC=example,DC=com", name),
            object_guid: "00000000-0000-0000-0000-000000000001".to_string(),
            object_category: category.to_string(),
        }
    }

    #[rstest]
    #[case("CN=Group,CN=Schema,CN=Configuration,DC=ad,DC=example,DC=com", ObjectType::Group)]
    #[case("CN=Person,CN=Schema,CN=Configuration,DC=ad,DC=example,DC=com", ObjectType::User)]
    #[case("CN=Computer,CN=Schema,CN=Configuration,DC=ad,DC=example,DC=com", ObjectType::Computer)]
    #[case("CN=Contact,CN=Schema,CN=Configuration,DC=ad,DC=example,DC=com", ObjectType::Other)]
    #[case("group", ObjectType::Group)]
    fn given_category_when_classifying_then_maps_to_object_type(
        #[case] category: &str,
        #[case] expected: ObjectType,
    ) {
        assert_eq!(ObjectType::from_category(category), expected);
    }

    #[test]
    fn given_record_when_building_node_then_derives_domain_and_type() {
        let node = Node::from_record(
            NodeId::ROOT,
            ParentRef::Root,
            record("ADMINS", "CN=Group,CN=Schema"),
        );

        assert_eq!(node.domain, "ad.example.com");
        assert_eq!(node.object_type, ObjectType::Group);
        assert_eq!(node.state, TraversalState::Pending);
        assert!(node.is_root());
        assert!(!node.rendered);
    }

    #[test]
    fn given_node_when_marked_circular_then_skipped_with_marker() {
        let mut node =
            Node::from_record(NodeId(2), ParentRef::Node(NodeId(1)), record("A", "group"));

        node.mark_circular();

        assert_eq!(node.name, "A - Circular Nesting!");
        assert_eq!(node.state, TraversalState::Skipped);
        assert!(node.is_circular());
        assert_eq!(node.base_name(), "A");
    }

    #[test]
    fn given_name_ending_in_marker_when_not_skipped_then_not_circular() {
        let node = Node::from_record(
            NodeId(1),
            ParentRef::Node(NodeId::ROOT),
            record("Ops - Circular Nesting!", "group"),
        );

        assert!(!node.is_circular());
        assert_eq!(node.base_name(), "Ops - Circular Nesting!");
    }

    #[test]
    fn given_direction_when_checking_expansion_then_downward_only_groups() {
        assert!(Direction::Downward.expands(ObjectType::Group));
        assert!(!Direction::Downward.expands(ObjectType::User));
        assert!(Direction::Upward.expands(ObjectType::Computer));
    }
}
