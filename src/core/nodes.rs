//! Node model
//!
//! The parsers produce a tree of [`Node`]s. Every node records the parsing
//! state it was produced under and its half-open source span
//! `[pos, pos_end)` in character offsets.

use std::ops::Index;
use std::sync::Arc;

use super::parsers::arguments::ArgumentSpec;
use super::specs::{EnvironmentSpec, MacroSpec, SpecialsSpec};
use super::state::ParsingState;

/// Node type
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A run of ordinary characters
    Chars { text: String },
    Macro {
        name: String,
        args: ParsedArguments,
        post_space: String,
        /// `None` for macros the registry does not know
        spec: Option<Arc<MacroSpec>>,
    },
    Group {
        open_delim: String,
        close_delim: String,
        children: NodeList,
    },
    Comment { text: String, post_space: String },
    Environment {
        name: String,
        args: ParsedArguments,
        body: NodeList,
        spec: Option<Arc<EnvironmentSpec>>,
    },
    Specials {
        symbol: String,
        args: ParsedArguments,
        spec: Arc<SpecialsSpec>,
    },
}

/// One element of the parsed tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub pos: usize,
    pub pos_end: usize,
    pub parsing_state: ParsingState,
}

impl Node {
    pub fn new(kind: NodeKind, pos: usize, pos_end: usize, parsing_state: ParsingState) -> Self {
        debug_assert!(pos_end >= pos);
        Self {
            kind,
            pos,
            pos_end,
            parsing_state,
        }
    }

    pub fn len(&self) -> usize {
        self.pos_end - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos_end == self.pos
    }

    /// The source text this node was parsed from
    pub fn latex_verbatim(&self) -> String {
        self.parsing_state.source_slice(self.pos, self.pos_end)
    }

    pub fn display_name(&self) -> String {
        match &self.kind {
            NodeKind::Chars { .. } => "text".to_string(),
            NodeKind::Macro { name, .. } => format!("macro '\\{}'", name),
            NodeKind::Group { open_delim, close_delim, .. } => {
                format!("group '{}...{}'", open_delim, close_delim)
            }
            NodeKind::Comment { .. } => "comment".to_string(),
            NodeKind::Environment { name, .. } => format!("environment '{{{}}}'", name),
            NodeKind::Specials { symbol, .. } => format!("specials '{}'", symbol),
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, NodeKind::Comment { .. })
    }

    /// Child list of groups and environment bodies
    pub fn children(&self) -> Option<&NodeList> {
        match &self.kind {
            NodeKind::Group { children, .. } => Some(children),
            NodeKind::Environment { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Parsed arguments of macros, environments and specials
    pub fn arguments(&self) -> Option<&ParsedArguments> {
        match &self.kind {
            NodeKind::Macro { args, .. }
            | NodeKind::Environment { args, .. }
            | NodeKind::Specials { args, .. } => Some(args),
            _ => None,
        }
    }
}

/// Ordered node sequence with its own span
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeList {
    pub nodes: Vec<Node>,
    pub pos: usize,
    pub pos_end: usize,
}

impl NodeList {
    /// Span runs from the first to the last node; an empty list sits at
    /// `fallback_pos` with zero length.
    pub fn new(nodes: Vec<Node>, fallback_pos: usize) -> Self {
        let (pos, pos_end) = match (nodes.first(), nodes.last()) {
            (Some(first), Some(last)) => (first.pos, last.pos_end),
            _ => (fallback_pos, fallback_pos),
        };
        Self {
            nodes,
            pos,
            pos_end,
        }
    }

    pub fn with_span(nodes: Vec<Node>, pos: usize, pos_end: usize) -> Self {
        Self {
            nodes,
            pos,
            pos_end,
        }
    }

    pub fn from_node(node: Node) -> Self {
        let (pos, pos_end) = (node.pos, node.pos_end);
        Self::with_span(vec![node], pos, pos_end)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn latex_verbatim(&self) -> String {
        self.nodes.iter().map(Node::latex_verbatim).collect()
    }
}

impl Index<usize> for NodeList {
    type Output = Node;

    fn index(&self, index: usize) -> &Node {
        &self.nodes[index]
    }
}

impl<'a> IntoIterator for &'a NodeList {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl IntoIterator for NodeList {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

/// Arguments of one callable invocation.
///
/// `values[i]` is the result for `spec_list[i]`, `None` when that optional
/// argument was absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArguments {
    pub spec_list: Vec<ArgumentSpec>,
    pub values: Vec<Option<NodeList>>,
    pub pos: usize,
    pub pos_end: usize,
}

impl ParsedArguments {
    pub fn new(
        spec_list: Vec<ArgumentSpec>,
        values: Vec<Option<NodeList>>,
        pos: usize,
        pos_end: usize,
    ) -> Self {
        debug_assert_eq!(spec_list.len(), values.len());
        Self {
            spec_list,
            values,
            pos,
            pos_end,
        }
    }

    /// No arguments, zero-length span at `pos`
    pub fn empty(pos: usize) -> Self {
        Self {
            pos,
            pos_end: pos,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NodeList> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn is_present(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Value of the argument whose spec carries `name`
    pub fn get_by_name(&self, name: &str) -> Option<&NodeList> {
        let index = self
            .spec_list
            .iter()
            .position(|spec| spec.name() == Some(name))?;
        self.get(index)
    }

    /// Whether any argument was present in the input
    pub fn has_values(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::SpecRegistry;

    fn state() -> ParsingState {
        let mut registry = SpecRegistry::new();
        registry.freeze();
        ParsingState::new(r"ab\x{c}", Arc::new(registry))
    }

    fn chars(text: &str, pos: usize) -> Node {
        Node::new(
            NodeKind::Chars {
                text: text.to_string(),
            },
            pos,
            pos + text.chars().count(),
            state(),
        )
    }

    #[test]
    fn test_node_list_span() {
        let ps = state();
        let a = Node::new(NodeKind::Chars { text: "ab".into() }, 0, 2, ps.clone());
        let b = Node::new(NodeKind::Chars { text: "c".into() }, 5, 6, ps);
        let list = NodeList::new(vec![a, b], 99);
        assert_eq!((list.pos, list.pos_end), (0, 6));
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].pos, 5);

        let empty = NodeList::new(Vec::new(), 4);
        assert_eq!((empty.pos, empty.pos_end), (4, 4));
        assert!(empty.is_empty());
    }

    #[test]
    fn test_latex_verbatim() {
        let node = chars("ab", 0);
        assert_eq!(node.latex_verbatim(), "ab");
        assert_eq!(node.len(), 2);
        assert_eq!(node.display_name(), "text");
    }

    #[test]
    fn test_parsed_arguments_lookup() {
        let specs = vec![
            ArgumentSpec::named("[", "opt").unwrap(),
            ArgumentSpec::named("{", "text").unwrap(),
        ];
        let value = NodeList::from_node(chars("c", 5));
        let args = ParsedArguments::new(specs, vec![None, Some(value.clone())], 5, 6);

        assert!(!args.is_present(0));
        assert!(args.is_present(1));
        assert_eq!(args.get_by_name("text"), Some(&value));
        assert_eq!(args.get_by_name("opt"), None);
        assert_eq!(args.get_by_name("nope"), None);
        assert!(args.has_values());
        assert!(!ParsedArguments::empty(3).has_values());
    }
}
