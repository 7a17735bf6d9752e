//! Crate root: wires together the compilation pipeline.
//!
//! The stages are intentionally small and composable so they can be evolved
//! independently:
//! - `tokenizer` performs lexical analysis and produces a flat token stream.
//! - `parser` owns all syntactic knowledge and returns an expression AST.
//! - `codegen` lowers the tree into x86-64 AT&T assembly for a stack machine.
//! - `error` centralises reporting utilities shared by the other modules.
//!
//! Data flows strictly one way: text, tokens, tree, instruction listing. No
//! stage reads back from a later one, and a fresh invocation shares no state
//! with a previous one.

pub mod error;
pub mod parser;
pub mod tokenizer;

mod codegen;

pub use error::{CompileError, CompileResult};

/// Compile a source string into AT&T assembly.
pub fn generate_assembly(expr: &str) -> CompileResult<String> {
  let tokens = tokenizer::tokenize(expr)?;
  let node = parser::parse(tokens, expr)?;
  Ok(codegen::generate(&node))
}
