use std::{collections::HashSet, fmt::Display, slice};

use itertools::Itertools;

use crate::utils::RegexFlags;

/// Index of a node inside a [`Graph`]. Identity of nodes is identity of ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const NEVER: NodeId = NodeId(0);
    pub const EMPTY: NodeId = NodeId(1);

    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    NeverMatch,
    EmptyMatch,
    Literal(char, NodeId),
    Wildcard(NodeId),
    // at least two branches, none of them NEVER
    Alternation(Vec<NodeId>),
    Repetition { head: NodeId, tail: NodeId },
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NeverMatch => write!(f, "∅"),
            Self::EmptyMatch => write!(f, "ε"),
            Self::Literal(symbol, next) => write!(f, "{:?} -> {}", symbol, next),
            Self::Wildcard(next) => write!(f, ". -> {}", next),
            Self::Alternation(branches) => write!(f, "| {}", branches.iter().join(" ")),
            Self::Repetition { head, tail } => write!(f, "* head {} tail {}", head, tail),
        }
    }
}

/// Arena holding a compiled pattern. Slots 0 and 1 are always the
/// `NeverMatch` and `EmptyMatch` sentinels.
///
/// Apart from the single repetition backpatch done by the compiler, nodes are
/// never written after they are pushed, and derivation only reads the arena.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Default for Graph {
    fn default() -> Self {
        Graph::new()
    }
}

impl Graph {
    pub fn new() -> Graph {
        Graph {
            nodes: vec![Node::NeverMatch, Node::EmptyMatch],
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    // drops nodes allocated by a failed compilation; the sentinels stay
    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len.max(2));
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn literal(&mut self, symbol: char, next: NodeId) -> NodeId {
        self.push(Node::Literal(symbol, next))
    }

    pub fn wildcard(&mut self, next: NodeId) -> NodeId {
        self.push(Node::Wildcard(next))
    }

    /// Builds an alternation over `branches`, dropping `NEVER` first.
    ///
    /// No live branch gives `NEVER`, a single live branch is returned as is,
    /// and only two or more live branches allocate an `Alternation` node.
    pub fn alternation<I>(&mut self, branches: I) -> NodeId
    where
        I: IntoIterator<Item = NodeId>,
    {
        let live = branches
            .into_iter()
            .filter(|branch| *branch != NodeId::NEVER)
            .collect_vec();
        match live.len() {
            0 => NodeId::NEVER,
            1 => live[0],
            _ => self.push(Node::Alternation(live)),
        }
    }

    /// Allocates a repetition whose head is still unresolved. The compiler
    /// closes the cycle with [`Graph::set_head`] once the body is compiled.
    pub fn repetition(&mut self, tail: NodeId) -> NodeId {
        self.push(Node::Repetition {
            head: NodeId::NEVER,
            tail,
        })
    }

    pub(crate) fn set_head(&mut self, repetition: NodeId, resolved: NodeId) {
        match &mut self.nodes[repetition.0] {
            Node::Repetition { head, .. } if *head == NodeId::NEVER => *head = resolved,
            node => panic!(
                "implementation error, {} is not an unresolved repetition: {}",
                repetition, node
            ),
        }
    }

    pub fn derive(&self, id: NodeId, symbol: char) -> State {
        self.derive_with(id, symbol, RegexFlags::NO_FLAG)
    }

    pub fn derive_with(&self, id: NodeId, symbol: char, flags: RegexFlags) -> State {
        self.derive_state(&State::Node(id), symbol, flags)
    }

    /// Residual of `state` after consuming `symbol`. Never fails: a mismatch
    /// anywhere simply contributes no branch.
    pub fn derive_state(&self, state: &State, symbol: char, flags: RegexFlags) -> State {
        let mut derivation = Derivation::new(self, symbol, flags);
        for branch in state.branches() {
            derivation.visit(*branch);
        }
        State::alternation(self, derivation.branches)
    }

    pub fn is_nullable(&self, id: NodeId) -> bool {
        self.is_nullable_any(slice::from_ref(&id))
    }

    pub fn can_continue(&self, id: NodeId) -> bool {
        self.can_continue_any(slice::from_ref(&id))
    }

    fn is_nullable_any(&self, starts: &[NodeId]) -> bool {
        self.find_unconsumed(starts, |node| matches!(node, Node::EmptyMatch))
    }

    fn can_continue_any(&self, starts: &[NodeId]) -> bool {
        self.find_unconsumed(starts, |node| {
            matches!(
                node,
                Node::Literal(_, _) | Node::Wildcard(_) | Node::Repetition { .. }
            )
        })
    }

    // looks for a node satisfying `found` among those reachable from `starts`
    // without consuming a symbol: alternation branches and repetition tails
    fn find_unconsumed<F>(&self, starts: &[NodeId], found: F) -> bool
    where
        F: Fn(&Node) -> bool,
    {
        let mut seen = HashSet::new();
        let mut pending = starts.to_vec();
        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            let node = self.get(id);
            if found(node) {
                return true;
            }
            match node {
                Node::Alternation(branches) => pending.extend(branches),
                Node::Repetition { tail, .. } => pending.push(*tail),
                _ => {}
            }
        }
        false
    }

    /// Nodes reachable from `start`, in breadth-first order.
    pub fn reachable(&self, start: NodeId) -> Vec<NodeId> {
        let mut seen = HashSet::from([start]);
        let mut order = vec![start];
        let mut index = 0;
        while index < order.len() {
            let successors: Vec<NodeId> = match self.get(order[index]) {
                Node::NeverMatch | Node::EmptyMatch => vec![],
                Node::Literal(_, next) | Node::Wildcard(next) => vec![*next],
                Node::Alternation(branches) => branches.clone(),
                Node::Repetition { head, tail } => vec![*head, *tail],
            };
            for successor in successors {
                if seen.insert(successor) {
                    order.push(successor);
                }
            }
            index += 1;
        }
        order
    }
}

struct Derivation<'g> {
    graph: &'g Graph,
    symbol: char,
    flags: RegexFlags,
    // every node expanded during this step; a second visit adds nothing, and
    // a repetition whose body matches the empty string leads back to itself
    visited: HashSet<NodeId>,
    pending: Vec<NodeId>,
    branches: Vec<NodeId>,
}

impl<'g> Derivation<'g> {
    fn new(graph: &'g Graph, symbol: char, flags: RegexFlags) -> Self {
        Derivation {
            graph,
            symbol,
            flags,
            visited: HashSet::new(),
            pending: Vec::new(),
            branches: Vec::new(),
        }
    }

    // depth first, children pushed in reverse so branches come out in
    // pattern order
    fn visit(&mut self, id: NodeId) {
        let graph = self.graph;
        self.pending.push(id);
        while let Some(id) = self.pending.pop() {
            if !self.visited.insert(id) {
                continue;
            }
            match graph.get(id) {
                Node::NeverMatch | Node::EmptyMatch => {}
                Node::Literal(expected, next) => {
                    if self.flags.symbols_equal(*expected, self.symbol) {
                        self.branches.push(*next);
                    }
                }
                Node::Wildcard(next) => self.branches.push(*next),
                Node::Alternation(branches) => self.pending.extend(branches.iter().rev()),
                Node::Repetition { head, tail } => {
                    self.pending.push(*tail);
                    self.pending.push(*head);
                }
            }
        }
    }
}

/// The residual pattern while matching: one graph node, or a transient
/// alternation of graph nodes produced by derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Node(NodeId),
    Alternation(Vec<NodeId>),
}

impl State {
    /// Same collapsing rule as [`Graph::alternation`]. Graph alternations are
    /// flattened into their branches and duplicates are dropped, keeping the
    /// order of first appearance.
    pub fn alternation<I>(graph: &Graph, branches: I) -> State
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut seen = HashSet::new();
        let mut live = Vec::new();
        for branch in branches {
            let mut pending = vec![branch];
            while let Some(id) = pending.pop() {
                if !seen.insert(id) {
                    continue;
                }
                match graph.get(id) {
                    Node::NeverMatch => {}
                    Node::Alternation(nested) => pending.extend(nested.iter().rev()),
                    _ => live.push(id),
                }
            }
        }
        match live.len() {
            0 => State::Node(NodeId::NEVER),
            1 => State::Node(live[0]),
            _ => State::Alternation(live),
        }
    }

    pub fn branches(&self) -> &[NodeId] {
        match self {
            State::Node(id) => slice::from_ref(id),
            State::Alternation(branches) => branches,
        }
    }

    pub fn is_never(&self) -> bool {
        *self == State::Node(NodeId::NEVER)
    }

    pub fn is_nullable(&self, graph: &Graph) -> bool {
        graph.is_nullable_any(self.branches())
    }

    pub fn can_continue(&self, graph: &Graph) -> bool {
        graph.can_continue_any(self.branches())
    }
}

impl Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Node(id) => write!(f, "{}", id),
            State::Alternation(branches) => write!(f, "{{{}}}", branches.iter().join(", ")),
        }
    }
}
