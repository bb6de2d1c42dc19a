// Escaping & whitespace engine.
//
// Pure functions over text runs. Rules may use them directly; the walker
// applies `collapse_whitespace` and `escape` to every text node and joins
// sibling output with `push_joined`.

mod escape;
mod whitespace;

pub use escape::{escape, unescape};
pub use whitespace::{
    chomp, code_fence, collapse_whitespace, finalize, indent, longest_backtick_run, push_joined,
    wrap_lines, Chomped,
};
