/// Parser for function-call expressions of the form
/// `search(query="rust", limit=10, tags=[1, 2])`.
///
/// Calls carry keyword arguments only, and argument values are restricted
/// to a JSON-like literal domain. Anything outside that domain (nested
/// calls, arbitrary identifiers, operators) is rejected with a `CallError`
/// describing the offending construct.
mod lexer;
mod parser;

pub use parser::{parse_call, ParsedCall};
