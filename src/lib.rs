pub mod compiler;
pub mod matching;
pub mod node;
pub mod pattern;
pub mod syntax;
pub mod utils;

pub use compiler::{Compiler, ReError, RegexGraph};
pub use matching::{Context, Matcher};
pub use node::{Graph, Node, NodeId, State};
pub use utils::RegexFlags;
