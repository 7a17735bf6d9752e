//! Code generation: lower the parsed AST into AT&T x86-64 assembly.
//!
//! The emitter targets a simple stack machine: every subtree leaves exactly
//! one value on the stack, and a binary node pops its two operands (right
//! first, then left) before pushing its result. The trailing `pop %rax`
//! in the epilogue collects the expression's value as the process exit
//! status.

use crate::parser::{AstNode, BinaryOp};

/// Emit a complete assembly listing for one expression.
pub fn generate(node: &AstNode) -> String {
  let mut asm = String::new();
  asm.push_str(".text\n");
  asm.push_str(".global main\n");
  asm.push_str("main:\n");

  emit_expr(node, &mut asm);

  asm.push_str("    pop %rax\n");
  asm.push_str("    ret\n");

  asm
}

/// Post-order walk emitting stack-based code for a single expression node.
fn emit_expr(node: &AstNode, asm: &mut String) {
  match node {
    AstNode::Num { value } => {
      asm.push_str(&format!("    mov ${value}, %rax\n"));
      asm.push_str("    push %rax\n");
    }
    AstNode::Binary { op, lhs, rhs } => {
      emit_expr(lhs, asm);
      emit_expr(rhs, asm);
      asm.push_str("    pop %rdi\n");
      asm.push_str("    pop %rax\n");
      match op {
        BinaryOp::Add => asm.push_str("    add %rdi, %rax\n"),
        BinaryOp::Sub => asm.push_str("    sub %rdi, %rax\n"),
        BinaryOp::Mul => asm.push_str("    imul %rdi, %rax\n"),
        BinaryOp::Div => {
          asm.push_str("    cqo\n");
          asm.push_str("    idiv %rdi\n");
        }
        BinaryOp::Mod => {
          // Zero %rdx up front so the divide never consumes a stale high
          // part; the remainder lands there and becomes the result.
          asm.push_str("    mov $0, %rdx\n");
          asm.push_str("    idiv %rdi\n");
          asm.push_str("    mov %rdx, %rax\n");
        }
        BinaryOp::Eq => {
          asm.push_str("    cmp %rdi, %rax\n");
          asm.push_str("    sete %al\n");
          asm.push_str("    movzbl %al, %eax\n");
        }
        BinaryOp::Ne => {
          asm.push_str("    cmp %rdi, %rax\n");
          asm.push_str("    setne %al\n");
          asm.push_str("    movzbl %al, %eax\n");
        }
        // The parser rewrites `>` and `>=` by swapping operands, so `Lt`
        // and `Le` are the only relational tags that can reach this point.
        BinaryOp::Lt => {
          asm.push_str("    cmp %rdi, %rax\n");
          asm.push_str("    setl %al\n");
          asm.push_str("    movzbl %al, %eax\n");
        }
        BinaryOp::Le => {
          asm.push_str("    cmp %rdi, %rax\n");
          asm.push_str("    setle %al\n");
          asm.push_str("    movzbl %al, %eax\n");
        }
      }
      asm.push_str("    push %rax\n");
    }
  }
}
