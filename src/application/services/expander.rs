//! Breadth-first expansion of the membership graph.
//!
//! Starting from one directory object, the expander repeatedly asks the
//! directory for the next ring of members (or memberships) and appends them to
//! a [`MembershipTree`]. Each discovered object becomes its own node, so an
//! object reachable along two paths appears twice; only cycles are cut.

use std::collections::VecDeque;

use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::{CycleCheck, TraversalConfig};
use crate::domain::dn::{domain_from_dn, first_rdn_value};
use crate::domain::{
    Direction, MembershipTree, Node, NodeId, ObjectRecord, ParentRef, TraversalState,
};
use crate::infrastructure::traits::DirectoryQuery;

/// Knobs bounding a single expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandOptions {
    pub cycle_check: CycleCheck,
    /// Upper bound on the number of nodes in the tree
    pub max_nodes: usize,
    /// Deepest level a node may be placed at (root is level 0)
    pub max_depth: usize,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self::from(&TraversalConfig::default())
    }
}

impl From<&TraversalConfig> for ExpandOptions {
    fn from(config: &TraversalConfig) -> Self {
        Self {
            cycle_check: config.cycle_check,
            max_nodes: config.max_nodes,
            max_depth: config.max_depth,
        }
    }
}

/// Builds the membership tree through a [`DirectoryQuery`].
pub struct GraphExpander<'a, D: DirectoryQuery + ?Sized> {
    directory: &'a D,
    options: ExpandOptions,
}

impl<'a, D: DirectoryQuery + ?Sized> GraphExpander<'a, D> {
    pub fn new(directory: &'a D, options: ExpandOptions) -> Self {
        Self { directory, options }
    }

    /// Expand the graph around `name` in `domain`.
    ///
    /// Node ids follow breadth-first discovery order. Any failed directory
    /// query aborts the whole expansion.
    #[instrument(level = "debug", skip(self))]
    pub fn expand(
        &self,
        name: &str,
        domain: &str,
        direction: Direction,
    ) -> ApplicationResult<MembershipTree> {
        self.directory.resolve_domain(domain)?;

        let record = self
            .directory
            .find_object_by_name(name, domain)?
            .ok_or_else(|| ApplicationError::ObjectNotFound {
                name: name.to_string(),
                domain: domain.to_string(),
            })?;

        let mut tree = MembershipTree::new();
        let root = tree.insert(Node::from_record(NodeId::ROOT, ParentRef::Root, record))?;
        let mut queue = VecDeque::from([root]);

        while let Some(id) = queue.pop_front() {
            let Some(node) = tree.get(id) else { continue };
            if !direction.expands(node.object_type) {
                set_state(&mut tree, id, TraversalState::NotApplicable);
                continue;
            }

            let records = self.query(node, domain, direction)?;
            debug!(
                "{} {} '{}': {} related objects",
                node.object_type,
                id,
                node.name,
                records.len()
            );
            let found = records.len();

            for record in records {
                let child = self.attach(&mut tree, id, record, direction)?;
                if tree.get(child).map(|n| n.state) == Some(TraversalState::Pending) {
                    queue.push_back(child);
                }
            }

            let state = if found == 0 && direction == Direction::Upward {
                TraversalState::NotApplicable
            } else {
                TraversalState::Queried
            };
            set_state(&mut tree, id, state);
        }

        info!("expanded {} nodes for {}@{}", tree.len(), name, domain);
        Ok(tree)
    }

    /// Fetch the objects one step away from `node` in `direction`.
    fn query(
        &self,
        node: &Node,
        fallback_domain: &str,
        direction: Direction,
    ) -> ApplicationResult<Vec<ObjectRecord>> {
        let domain = if node.domain.is_empty() {
            fallback_domain
        } else {
            node.domain.as_str()
        };

        match direction {
            Direction::Downward => Ok(self
                .directory
                .find_group_members(&node.distinguished_name, domain)?),
            Direction::Upward => {
                let lookup = if node.sam_account_name.is_empty() {
                    node.base_name()
                } else {
                    node.sam_account_name.as_str()
                };
                let group_dns = self.directory.find_memberships_of(lookup, domain)?;

                let mut records = Vec::with_capacity(group_dns.len());
                for dn in group_dns {
                    match self.resolve_membership(&dn, domain)? {
                        Some(record) => records.push(record),
                        None => warn!(
                            "membership {} of '{}' does not resolve, skipping",
                            dn, node.name
                        ),
                    }
                }
                Ok(records)
            }
        }
    }

    /// Resolve a membership DN to the group it names.
    ///
    /// The lookup goes by the DN's leading RDN value; when that name belongs to
    /// a different object the DN itself is looked up.
    fn resolve_membership(
        &self,
        dn: &str,
        fallback_domain: &str,
    ) -> ApplicationResult<Option<ObjectRecord>> {
        let group_name = first_rdn_value(dn)?;
        let group_domain = match domain_from_dn(dn) {
            d if d.is_empty() => fallback_domain.to_string(),
            d => d,
        };

        match self
            .directory
            .find_object_by_name(&group_name, &group_domain)?
        {
            Some(record) if record.distinguished_name.eq_ignore_ascii_case(dn) => Ok(Some(record)),
            Some(other) => {
                debug!(
                    "'{}' matched {}, looking up {} by DN",
                    group_name, other.distinguished_name, dn
                );
                Ok(self.directory.find_object_by_dn(dn, &group_domain)?)
            }
            None => Ok(None),
        }
    }

    /// Append a child of `parent` built from `record`, applying cycle detection.
    fn attach(
        &self,
        tree: &mut MembershipTree,
        parent: NodeId,
        record: ObjectRecord,
        direction: Direction,
    ) -> ApplicationResult<NodeId> {
        if tree.len() >= self.options.max_nodes {
            return Err(ApplicationError::TraversalLimit {
                limit: "max_nodes",
                value: self.options.max_nodes,
            });
        }
        if tree.depth(parent) + 1 > self.options.max_depth {
            return Err(ApplicationError::TraversalLimit {
                limit: "max_depth",
                value: self.options.max_depth,
            });
        }

        let mut node = Node::from_record(tree.next_id(), ParentRef::Node(parent), record);
        if self.closes_cycle(tree, parent, &node.guid) {
            debug!("{} '{}' under node {} closes a cycle", node.object_type, node.name, parent);
            node.mark_circular();
        } else if !direction.expands(node.object_type) {
            node.state = TraversalState::NotApplicable;
        }
        Ok(tree.insert(node)?)
    }

    /// Whether a child of `parent` with `guid` repeats an object up the chain.
    fn closes_cycle(&self, tree: &MembershipTree, parent: NodeId, guid: &str) -> bool {
        match self.options.cycle_check {
            CycleCheck::Grandparent => tree.parent_of(parent).is_some_and(|gp| gp.guid == guid),
            CycleCheck::Ancestors => tree
                .get(parent)
                .into_iter()
                .chain(tree.ancestors(parent))
                .any(|n| n.guid == guid),
        }
    }
}

fn set_state(tree: &mut MembershipTree, id: NodeId, state: TraversalState) {
    if let Some(node) = tree.get_mut(id) {
        node.state = state;
    }
}
