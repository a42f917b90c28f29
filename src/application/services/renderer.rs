//! Tree-to-text rendering.
//!
//! The renderer walks the finished [`MembershipTree`] depth first and emits one
//! [`RenderedLine`] per node. Each frame carries the "is last child" bits of
//! its path, from which the branch prefix is computed directly.

use std::fmt;

use itertools::Itertools;
use tracing::{instrument, warn};

use crate::domain::dn::short_domain_name;
use crate::domain::{MembershipTree, Node, NodeId, ObjectType, CIRCULAR_NESTING_MARKER};

/// Presentation tag for a line; the printer decides what it looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleHint {
    Root,
    Group,
    CircularGroup,
    Computer,
    Plain,
}

/// Characters used to draw branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlyphSet {
    #[default]
    Unicode,
    Ascii,
}

impl GlyphSet {
    /// Connector for a child with later siblings.
    pub fn tee(self) -> &'static str {
        match self {
            GlyphSet::Unicode => "├── ",
            GlyphSet::Ascii => "|-- ",
        }
    }

    /// Connector for the last child.
    pub fn corner(self) -> &'static str {
        match self {
            GlyphSet::Unicode => "└── ",
            GlyphSet::Ascii => "`-- ",
        }
    }

    /// Continuation below an ancestor that has later siblings.
    pub fn stem(self) -> &'static str {
        match self {
            GlyphSet::Unicode => "│   ",
            GlyphSet::Ascii => "|   ",
        }
    }

    /// Padding below an ancestor that was the last child.
    pub fn blank(self) -> &'static str {
        "    "
    }
}

/// One output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub node: NodeId,
    pub depth: usize,
    pub indent: String,
    pub text: String,
    pub style: StyleHint,
}

impl fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.indent, self.text)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TreeRenderer {
    glyphs: GlyphSet,
}

impl TreeRenderer {
    pub fn new(glyphs: GlyphSet) -> Self {
        Self { glyphs }
    }

    /// Render every node once, parents before children, marking each as rendered.
    ///
    /// Nodes already flagged as rendered are not emitted again; call
    /// [`MembershipTree::reset_rendered`] to render the same tree twice.
    #[instrument(level = "debug", skip_all, fields(nodes = tree.len()))]
    pub fn render(&self, tree: &mut MembershipTree) -> Vec<RenderedLine> {
        let mut lines = Vec::with_capacity(tree.len());
        if !tree.is_empty() {
            self.walk(tree, NodeId::ROOT, &[], &mut lines);
        }
        lines
    }

    fn walk(
        &self,
        tree: &mut MembershipTree,
        id: NodeId,
        last_bits: &[bool],
        lines: &mut Vec<RenderedLine>,
    ) {
        let Some(node) = tree.get_mut(id) else { return };
        if node.rendered {
            warn!("node {} reached twice, not rendering again", id);
            return;
        }
        node.rendered = true;

        let node = &*node;
        lines.push(RenderedLine {
            node: id,
            depth: last_bits.len(),
            indent: self.indent(last_bits),
            text: display_text(node),
            style: style_hint(node),
        });

        let children = ordered_children(tree, id);
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            let mut child_bits = last_bits.to_vec();
            child_bits.push(i + 1 == count);
            self.walk(tree, child, &child_bits, lines);
        }
    }

    /// Branch prefix for a node whose path carries `last_bits`.
    fn indent(&self, last_bits: &[bool]) -> String {
        let Some((&is_last, ancestors)) = last_bits.split_last() else {
            return String::new();
        };
        let mut indent: String = ancestors
            .iter()
            .map(|&ancestor_last| {
                if ancestor_last {
                    self.glyphs.blank()
                } else {
                    self.glyphs.stem()
                }
            })
            .collect();
        indent.push_str(if is_last {
            self.glyphs.corner()
        } else {
            self.glyphs.tee()
        });
        indent
    }
}

/// Children of `id` with groups first, discovery order otherwise.
pub fn ordered_children(tree: &MembershipTree, id: NodeId) -> Vec<NodeId> {
    tree.children(id)
        .iter()
        .copied()
        .sorted_by_key(|&child| {
            !tree
                .get(child)
                .is_some_and(|n| n.object_type.is_group())
        })
        .collect()
}

fn qualified(domain: &str, name: &str) -> String {
    let short = short_domain_name(domain);
    if short.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", short, name)
    }
}

/// Text shown for a node, by type.
pub fn display_text(node: &Node) -> String {
    if node.is_root() {
        return qualified(&node.domain, &node.name);
    }
    match node.object_type {
        ObjectType::Group => {
            let text = qualified(&node.domain, node.base_name()).to_uppercase();
            if node.is_circular() {
                format!("{} {}", text, CIRCULAR_NESTING_MARKER)
            } else {
                text
            }
        }
        ObjectType::Computer => {
            format!("{} - {}", node.sam_account_name.to_lowercase(), node.name)
        }
        ObjectType::User | ObjectType::Other => {
            if node.sam_account_name.is_empty() || node.sam_account_name == node.name {
                node.name.clone()
            } else {
                format!("{} - {}", node.sam_account_name, node.name)
            }
        }
    }
}

pub fn style_hint(node: &Node) -> StyleHint {
    if node.is_root() {
        return StyleHint::Root;
    }
    if node.is_circular() {
        return StyleHint::CircularGroup;
    }
    match node.object_type {
        ObjectType::Group => StyleHint::Group,
        ObjectType::Computer => StyleHint::Computer,
        ObjectType::User | ObjectType::Other => StyleHint::Plain,
    }
}
