use tracing::{debug, trace};

use crate::{
    compiler::RegexGraph,
    node::{Graph, NodeId, State},
    utils::RegexFlags,
};

#[derive(Debug, Hash)]
pub struct Context {
    pub text: Vec<char>,
    pub flags: RegexFlags,
}

impl Context {
    pub fn new(text: Vec<char>) -> Context {
        Context {
            text,
            flags: RegexFlags::NO_FLAG,
        }
    }

    pub fn new_with_flags(text: Vec<char>, flags: RegexFlags) -> Context {
        Context { text, flags }
    }
}

pub trait Matcher {
    fn get_flags(&self) -> RegexFlags;

    fn match_context(&self, context: &Context) -> bool;

    fn is_match(&self, text: &str) -> bool {
        self.match_context(&Context::new_with_flags(
            text.chars().collect(),
            self.get_flags(),
        ))
    }

    fn match_symbols(&self, symbols: &[char]) -> bool {
        self.match_context(&Context::new_with_flags(symbols.to_vec(), self.get_flags()))
    }
}

/// Derives `start` by every symbol of the context, in order.
///
/// Accepts as soon as the last symbol leaves a nullable state. Rejects early
/// once the state is nullable but can no longer consume anything while input
/// remains, unless `NO_EARLY_EXIT` is set. An empty text matches exactly when
/// `start` is nullable.
pub fn run(graph: &Graph, start: NodeId, context: &Context) -> bool {
    let text = &context.text;
    if text.is_empty() {
        return graph.is_nullable(start);
    }
    let last = text.len() - 1;
    let early_exit = !context.flags.intersects(RegexFlags::NO_EARLY_EXIT);

    let mut state = State::Node(start);
    for (position, symbol) in text.iter().enumerate() {
        state = graph.derive_state(&state, *symbol, context.flags);
        trace!(position, symbol = %symbol, state = %state, "derived");

        let nullable = state.is_nullable(graph);
        if nullable && position == last {
            return true;
        }
        if nullable && early_exit && !state.can_continue(graph) {
            debug!(
                position,
                remaining = last - position,
                "pattern spent before the input, rejecting"
            );
            return false;
        }
    }
    false
}

impl Matcher for RegexGraph {
    fn get_flags(&self) -> RegexFlags {
        self.flags()
    }

    fn match_context(&self, context: &Context) -> bool {
        run(self.graph(), self.start(), context)
    }
}
