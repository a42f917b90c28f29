use tracing::instrument;

use crate::domain::entities::{Node, NodeId, ParentRef};
use crate::domain::error::DomainError;

/// Append-only set of nodes forming the membership tree.
///
/// Nodes are stored at the index of their id, so ids are sequential and never
/// reused. Each node keeps its children in discovery order.
#[derive(Debug, Default, Clone)]
pub struct MembershipTree {
    nodes: Vec<Node>,
    children: Vec<Vec<NodeId>>,
}

impl MembershipTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next inserted node will receive.
    pub fn next_id(&self) -> NodeId {
        NodeId(self.nodes.len())
    }

    /// Insert a node under its parent, assigning it the next sequential id.
    ///
    /// The first node must be the root; every later node must link to an
    /// existing parent.
    #[instrument(level = "trace", skip(self, node), fields(name = %node.name))]
    pub fn insert(&mut self, mut node: Node) -> Result<NodeId, DomainError> {
        let id = self.next_id();
        match node.parent {
            ParentRef::Root if !self.nodes.is_empty() => return Err(DomainError::SecondRoot(id)),
            ParentRef::Node(parent) if self.nodes.is_empty() => {
                return Err(DomainError::MissingRoot(parent))
            }
            ParentRef::Node(parent) => match self.children.get_mut(parent.index()) {
                Some(siblings) => siblings.push(id),
                None => return Err(DomainError::UnknownParent { node: id, parent }),
            },
            ParentRef::Root => {}
        }
        node.id = id;
        self.nodes.push(node);
        self.children.push(Vec::new());
        Ok(id)
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Children of `id` in discovery order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn parent_of(&self, id: NodeId) -> Option<&Node> {
        self.get(id)
            .and_then(|n| n.parent.node())
            .and_then(|p| self.get(p))
    }

    /// Ancestors of `id`, nearest first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(id).and_then(|n| n.parent.node()),
        }
    }

    /// Number of parent links between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn reset_rendered(&mut self) {
        for node in &mut self.nodes {
            node.rendered = false;
        }
    }
}

pub struct Ancestors<'a> {
    tree: &'a MembershipTree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tree.get(self.next?)?;
        self.next = node.parent.node();
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ObjectRecord;

    fn add(tree: &mut MembershipTree, name: &str, parent: ParentRef) -> NodeId {
        let record = ObjectRecord {
            name: name.to_string(),
            sam_account_name: name.to_string(),
            distinguished_name: format!("CN={},DC=example,DC=com", name),
            object_guid: format!("guid-{}", name),
            object_category: "group".to_string(),
        };
        let node = Node::from_record(tree.next_id(), parent, record);
        tree.insert(node).unwrap()
    }

    fn sample() -> MembershipTree {
        // root -> a -> c, root -> b
        let mut tree = MembershipTree::new();
        let root = add(&mut tree, "root", ParentRef::Root);
        let a = add(&mut tree, "a", ParentRef::Node(root));
        add(&mut tree, "b", ParentRef::Node(root));
        add(&mut tree, "c", ParentRef::Node(a));
        tree
    }

    #[test]
    fn given_inserted_nodes_when_reading_then_ids_are_sequential() {
        let tree = sample();

        let ids: Vec<usize> = tree.nodes().iter().map(|n| n.id.index()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(tree.root().map(|n| n.name.as_str()), Some("root"));
        assert_eq!(tree.children(NodeId(0)), &[NodeId(1), NodeId(2)]);
    }

    #[test]
    fn given_nested_node_when_walking_ancestors_then_nearest_first() {
        let tree = sample();

        let names: Vec<&str> = tree.ancestors(NodeId(3)).map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a", "root"]);
        assert_eq!(tree.depth(NodeId(3)), 2);
        assert_eq!(tree.depth(NodeId::ROOT), 0);
        assert_eq!(tree.parent_of(NodeId(3)).map(|n| n.id), Some(NodeId(1)));
        assert!(tree.parent_of(NodeId::ROOT).is_none());
    }

    fn orphan(name: &str, parent: ParentRef) -> Node {
        let record = ObjectRecord {
            name: name.to_string(),
            sam_account_name: name.to_string(),
            distinguished_name: format!("CN={},DC=example,DC=com", name),
            object_guid: format!("guid-{}", name),
            object_category: "group".to_string(),
        };
        Node::from_record(NodeId(99), parent, record)
    }

    #[test]
    fn given_missing_parent_when_inserting_then_rejected_and_tree_unchanged() {
        let mut tree = sample();

        let result = tree.insert(orphan("x", ParentRef::Node(NodeId(7))));

        assert_eq!(
            result,
            Err(DomainError::UnknownParent {
                node: NodeId(4),
                parent: NodeId(7)
            })
        );
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn given_root_exists_when_inserting_another_root_then_rejected() {
        let mut tree = sample();

        assert_eq!(
            tree.insert(orphan("x", ParentRef::Root)),
            Err(DomainError::SecondRoot(NodeId(4)))
        );
    }

    #[test]
    fn given_empty_tree_when_inserting_child_then_rejected() {
        let mut tree = MembershipTree::new();

        assert_eq!(
            tree.insert(orphan("x", ParentRef::Node(NodeId(0)))),
            Err(DomainError::MissingRoot(NodeId(0)))
        );
        assert!(tree.is_empty());
    }

    #[test]
    fn given_node_with_stale_id_when_inserting_then_id_assigned_by_tree() {
        let mut tree = sample();

        let id = tree.insert(orphan("x", ParentRef::Node(NodeId(1)))).unwrap();

        assert_eq!(id, NodeId(4));
        assert_eq!(tree.get(id).map(|n| n.id), Some(NodeId(4)));
        assert_eq!(tree.children(NodeId(1)), &[NodeId(3), NodeId(4)]);
    }

    #[test]
    fn given_rendered_nodes_when_reset_then_all_cleared() {
        let mut tree = sample();
        tree.get_mut(NodeId(2)).unwrap().rendered = true;

        tree.reset_rendered();

        assert!(tree.nodes().iter().all(|n| !n.rendered));
    }
}
