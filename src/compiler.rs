use colored::Colorize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::{
    node::{Graph, Node, NodeId},
    pattern::{self, Shape},
    syntax::{self, SyntaxError},
    utils::RegexFlags,
};

#[derive(Debug, Error, PartialEq)]
pub enum ReError {
    #[error("invalid pattern shape: {0}")]
    InvalidPatternShape(Value),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl ReError {
    pub fn render(&self) -> String {
        match self {
            Self::InvalidPatternShape(value) => format!(
                "{} {}:\n | {}",
                format!("[{:0>3}]", 1).red().bold(),
                "not a valid pattern description",
                value.to_string().yellow()
            ),
            Self::Syntax(err) => err.render(),
        }
    }
}

/// Turns pattern descriptions into nodes of a single [`Graph`], threading the
/// continuation ("what comes after") through the recursion.
#[derive(Debug, Default)]
pub struct Compiler {
    graph: Graph,
}

impl Compiler {
    pub fn new() -> Compiler {
        Compiler {
            graph: Graph::new(),
        }
    }

    /// Compiles `description` so that completing it continues at `tail`.
    /// On failure every node allocated by this call is discarded.
    pub fn compile(&mut self, description: &Value, tail: NodeId) -> Result<NodeId, ReError> {
        let mark = self.graph.node_count();
        let compiled = self.compile_node(description, tail);
        if compiled.is_err() {
            self.graph.truncate(mark);
        }
        compiled
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn finish(self) -> Graph {
        self.graph
    }

    fn compile_node(&mut self, description: &Value, tail: NodeId) -> Result<NodeId, ReError> {
        match pattern::shape(description) {
            Some(Shape::Text(text)) => Ok(self.compile_text(text, tail)),
            Some(Shape::Sequence(items)) => self.compile_sequence(items, tail),
            Some(Shape::Or(alternatives)) => self.compile_or(alternatives, tail),
            Some(Shape::Any) => Ok(self.graph.wildcard(tail)),
            Some(Shape::ZeroOrMore(repeatable)) => self.compile_zero_or_more(repeatable, tail),
            None => Err(ReError::InvalidPatternShape(description.clone())),
        }
    }

    fn compile_text(&mut self, text: &str, tail: NodeId) -> NodeId {
        text.chars()
            .rev()
            .fold(tail, |next, symbol| self.graph.literal(symbol, next))
    }

    fn compile_sequence(&mut self, items: &[Value], tail: NodeId) -> Result<NodeId, ReError> {
        items
            .iter()
            .rev()
            .try_fold(tail, |next, item| self.compile_node(item, next))
    }

    fn compile_or(&mut self, alternatives: &[Value], tail: NodeId) -> Result<NodeId, ReError> {
        let branches = alternatives
            .iter()
            .map(|alternative| self.compile_node(alternative, tail))
            .collect::<Result<Vec<NodeId>, ReError>>()?;
        Ok(self.graph.alternation(branches))
    }

    // the body continues at the repetition itself, which closes the cycle
    fn compile_zero_or_more(
        &mut self,
        repeatable: &Value,
        tail: NodeId,
    ) -> Result<NodeId, ReError> {
        let repetition = self.graph.repetition(tail);
        let head = self.compile_node(repeatable, repetition)?;
        self.graph.set_head(repetition, head);
        Ok(repetition)
    }
}

/// A fully compiled pattern: the description it came from, its node graph and
/// the start node. Immutable once built, so it can be shared between threads.
#[derive(Debug, Clone)]
pub struct RegexGraph {
    pattern: Value,
    flags: RegexFlags,
    graph: Graph,
    start: NodeId,
}

impl RegexGraph {
    pub fn compile(description: &Value) -> Result<RegexGraph, ReError> {
        RegexGraph::with_flags(description, RegexFlags::NO_FLAG)
    }

    pub fn with_flags(description: &Value, flags: RegexFlags) -> Result<RegexGraph, ReError> {
        let mut compiler = Compiler::new();
        let start = compiler.compile(description, NodeId::EMPTY)?;
        let graph = compiler.finish();
        debug!(
            nodes = graph.node_count(),
            start = %start,
            "compiled pattern {}",
            description
        );
        Ok(RegexGraph {
            pattern: description.clone(),
            flags,
            graph,
            start,
        })
    }

    pub fn parse(text: &str) -> Result<RegexGraph, ReError> {
        RegexGraph::parse_with_flags(text, RegexFlags::NO_FLAG)
    }

    pub fn parse_with_flags(text: &str, flags: RegexFlags) -> Result<RegexGraph, ReError> {
        let description = syntax::parse(text)?;
        RegexGraph::with_flags(&description, flags)
    }

    pub fn pattern(&self) -> &Value {
        &self.pattern
    }

    pub fn flags(&self) -> RegexFlags {
        self.flags
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Graphviz Dot code for the part of the graph reachable from the start.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        let opts = "[fillcolor=\"#EEEEEE\" fontcolor=\"#888888\"]";
        for id in self.graph.reachable(self.start) {
            let node = self.graph.get(id);
            let label = match node {
                Node::NeverMatch => "∅".to_string(),
                Node::EmptyMatch => "ε".to_string(),
                Node::Alternation(_) => "|".to_string(),
                Node::Repetition { .. } => "*".to_string(),
                Node::Literal(_, _) | Node::Wildcard(_) => id.index().to_string(),
            };
            if id == self.start {
                out += &format!("node_{}[label=\"{}\"][fillcolor=green]\n", id.index(), label);
            } else if id == NodeId::EMPTY {
                out += &format!(
                    "node_{}[label=\"{}\" shape=doublecircle]\n",
                    id.index(),
                    label
                );
            } else {
                out += &format!("node_{}[label=\"{}\"]{}\n", id.index(), label, opts);
            }

            match node {
                Node::NeverMatch | Node::EmptyMatch => {}
                Node::Literal(symbol, next) => {
                    out += &format!(
                        "node_{} -> node_{}[label=\"{}\"]\n",
                        id.index(),
                        next.index(),
                        escape(*symbol)
                    );
                }
                Node::Wildcard(next) => {
                    out += &format!("node_{} -> node_{}[label=\".\"]\n", id.index(), next.index());
                }
                Node::Alternation(branches) => {
                    for branch in branches {
                        out += &format!(
                            "node_{} -> node_{}[style=dashed]\n",
                            id.index(),
                            branch.index()
                        );
                    }
                }
                Node::Repetition { head, tail } => {
                    out += &format!(
                        "node_{} -> node_{}[label=\"head\" style=bold]\n",
                        id.index(),
                        head.index()
                    );
                    out += &format!("node_{} -> node_{}[style=dashed]\n", id.index(), tail.index());
                }
            }
        }
        let opts = "node [shape=circle style=filled fillcolor=\"#4385f5\" fontcolor=\"#FFFFFF\" \
        color=white penwidth=5.0 margin=0.1 width=0.5 height=0.5 fixedsize=true]";
        format!(
            "digraph G {{  rankdir=\"LR\" graph [fontname = \"Courier New\"];
                node [fontname = \"verdana\", style = rounded];
                edge [fontname = \"verdana\"];
                {{\n{}\n{}\n}}}}",
            opts, out
        )
    }
}

fn escape(symbol: char) -> String {
    match symbol {
        '"' | '\\' => format!("\\{}", symbol),
        '\n' => "\\n".to_string(),
        _ => symbol.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        node::State,
        pattern::{any, digit, or, seq, text, zero_or_more},
    };

    #[test]
    fn test_compile_text_builds_literal_chain() {
        let mut compiler = Compiler::new();
        let start = compiler.compile(&text("ab"), NodeId::EMPTY).unwrap();
        let graph = compiler.graph();
        match graph.get(start) {
            Node::Literal('a', next) => {
                assert_eq!(graph.get(*next), &Node::Literal('b', NodeId::EMPTY))
            }
            node => panic!("expected literal 'a', got {}", node),
        }
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn test_empty_text_and_sequence_compile_to_tail() {
        let mut compiler = Compiler::new();
        let tail = compiler.compile(&text("z"), NodeId::EMPTY).unwrap();
        assert_eq!(compiler.compile(&text(""), tail).unwrap(), tail);
        assert_eq!(compiler.compile(&json!([]), tail).unwrap(), tail);
        assert_eq!(compiler.compile(&json!(["", [""]]), tail).unwrap(), tail);
    }

    #[test]
    fn test_sequence_is_right_fold() {
        let mut compiler = Compiler::new();
        let start = compiler.compile(&json!(["ab", "c"]), NodeId::EMPTY).unwrap();
        let graph = compiler.graph();
        let mut state = State::Node(start);
        for symbol in "abc".chars() {
            state = graph.derive_state(&state, symbol, RegexFlags::NO_FLAG);
        }
        assert_eq!(state, State::Node(NodeId::EMPTY));
    }

    #[test]
    fn test_or_shares_tail() {
        let mut compiler = Compiler::new();
        let tail = compiler.compile(&text("d"), NodeId::EMPTY).unwrap();
        let start = compiler.compile(&or(vec![text("a"), text("b")]), tail).unwrap();
        let graph = compiler.graph();
        match graph.get(start) {
            Node::Alternation(branches) => {
                assert_eq!(branches.len(), 2);
                for branch in branches {
                    match graph.get(*branch) {
                        Node::Literal(_, next) => assert_eq!(*next, tail),
                        node => panic!("expected literal, got {}", node),
                    }
                }
            }
            node => panic!("expected alternation, got {}", node),
        }
    }

    #[test]
    fn test_single_alternative_collapses() {
        let mut compiler = Compiler::new();
        let start = compiler.compile(&or(vec![text("a")]), NodeId::EMPTY).unwrap();
        assert_eq!(
            compiler.graph().get(start),
            &Node::Literal('a', NodeId::EMPTY)
        );
        assert_eq!(compiler.graph().node_count(), 3);
    }

    #[test]
    fn test_wildcard() {
        let mut compiler = Compiler::new();
        let start = compiler.compile(&any(), NodeId::EMPTY).unwrap();
        assert_eq!(compiler.graph().get(start), &Node::Wildcard(NodeId::EMPTY));
    }

    #[test]
    fn test_zero_or_more_closes_cycle() {
        let mut compiler = Compiler::new();
        let start = compiler
            .compile(&zero_or_more(text("ab")), NodeId::EMPTY)
            .unwrap();
        let graph = compiler.graph();
        let head = match graph.get(start) {
            Node::Repetition { head, tail } => {
                assert_eq!(*tail, NodeId::EMPTY);
                *head
            }
            node => panic!("expected repetition, got {}", node),
        };
        let b = match graph.get(head) {
            Node::Literal('a', next) => *next,
            node => panic!("expected literal 'a', got {}", node),
        };
        assert_eq!(graph.get(b), &Node::Literal('b', start));
    }

    #[test]
    fn test_zero_or_more_of_empty_text_points_at_itself() {
        let mut compiler = Compiler::new();
        let start = compiler.compile(&zero_or_more(text("")), NodeId::EMPTY).unwrap();
        assert_eq!(
            compiler.graph().get(start),
            &Node::Repetition {
                head: start,
                tail: NodeId::EMPTY
            }
        );
    }

    #[test]
    fn test_invalid_shape_carries_offending_value() {
        assert_eq!(
            RegexGraph::compile(&json!(42)).unwrap_err(),
            ReError::InvalidPatternShape(json!(42))
        );
        assert_eq!(
            RegexGraph::compile(&json!(["a", {"or": ["b", null]}])).unwrap_err(),
            ReError::InvalidPatternShape(json!(null))
        );
        assert_eq!(
            RegexGraph::compile(&json!({"zero_or_more": {"or": []}})).unwrap_err(),
            ReError::InvalidPatternShape(json!({"or": []}))
        );
    }

    #[test]
    fn test_failed_compile_leaves_no_nodes() {
        let mut compiler = Compiler::new();
        let tail = compiler.compile(&text("ok"), NodeId::EMPTY).unwrap();
        let before = compiler.graph().node_count();
        let failed = compiler.compile(&seq(vec![json!(7), zero_or_more(text("abc"))]), tail);
        assert!(failed.is_err());
        assert_eq!(compiler.graph().node_count(), before);
    }

    #[test]
    fn test_parse_errors_are_wrapped() {
        match RegexGraph::parse("ab)") {
            Err(ReError::Syntax(err)) => assert_eq!(err.position, 2),
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_regex_graph_accessors() {
        let description = seq(vec![digit(), text("-"), digit()]);
        let regex = RegexGraph::with_flags(&description, RegexFlags::IGNORECASE).unwrap();
        assert_eq!(regex.pattern(), &description);
        assert_eq!(regex.flags(), RegexFlags::IGNORECASE);
        assert_eq!(regex.node_count(), regex.graph().node_count());
        assert!(!regex.graph().is_nullable(regex.start()));
    }

    #[test]
    fn test_to_dot() {
        let regex = RegexGraph::compile(&seq(vec![zero_or_more(text("a\"")), any()])).unwrap();
        let dot = regex.to_dot();
        assert!(dot.starts_with("digraph G"));
        assert!(dot.contains("[fillcolor=green]"));
        assert!(dot.contains("shape=doublecircle"));
        assert!(dot.contains("[label=\"head\" style=bold]"));
        assert!(dot.contains("[label=\"\\\"\"]"));
        assert!(dot.contains("[label=\".\"]"));
    }

    #[test]
    fn test_render_mentions_value() {
        let err = RegexGraph::compile(&json!(3.5)).unwrap_err();
        assert!(err.render().contains("3.5"));
        assert_eq!(err.to_string(), "invalid pattern shape: 3.5");
    }
}
