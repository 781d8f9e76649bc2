//! Code generation: evaluate the AST and lower it to register-machine code.
//!
//! Every expression leaves its value in the most recently allocated
//! register. A binary operation evaluates both operands, then folds the two
//! newest registers into the lower one, so a finished expression always
//! nets exactly one live register. Variables live in memory slots and are
//! reloaded on every read.

use snafu::ensure;
use tracing::trace;

use crate::asm::Instruction;
use crate::context::Context;
use crate::error::{CompileResult, DivideByZeroSnafu};
use crate::parser::{AssignOp, AstNode, BinaryOp};
use crate::symbol;

/// Lower one statement's tree. Instructions are appended to `out` as they
/// are produced, so a fatal error still leaves everything emitted before it.
pub fn generate(
  node: &AstNode,
  ctx: &mut Context,
  out: &mut Vec<Instruction>,
) -> CompileResult<i32> {
  Emitter { ctx, out }.emit_expr(node)
}

struct Emitter<'a> {
  ctx: &'a mut Context,
  out: &'a mut Vec<Instruction>,
}

impl Emitter<'_> {
  fn push(&mut self, instr: Instruction) {
    trace!(%instr, "emit");
    self.out.push(instr);
  }

  fn emit_expr(&mut self, node: &AstNode) -> CompileResult<i32> {
    match node {
      AstNode::Num { value } => {
        let reg = self.ctx.registers.alloc();
        self.push(Instruction::load_imm(reg, *value));
        Ok(*value)
      }
      AstNode::Var { name } => self.emit_load(name),
      AstNode::Binary { op, lhs, rhs } => {
        let lhs = self.emit_expr(lhs)?;
        let rhs = self.emit_expr(rhs)?;
        self.emit_binary(*op, lhs, rhs)
      }
      AstNode::Assign { op, name, rhs } => {
        let value = match op.arithmetic() {
          None => self.emit_expr(rhs)?,
          Some(arith) => {
            let old = self.emit_load(name)?;
            let rhs = self.emit_expr(rhs)?;
            self.emit_binary(arith, old, rhs)?
          }
        };
        self.emit_store(*op, name, value)
      }
    }
  }

  fn emit_load(&mut self, name: &str) -> CompileResult<i32> {
    self.ctx.identifier_seen = true;
    let value = self.ctx.symbols.get(name)?;
    let slot = self.slot_of(name);
    let reg = self.ctx.registers.alloc();
    self.push(Instruction::load(reg, symbol::offset(slot)));
    Ok(value)
  }

  fn emit_store(&mut self, op: AssignOp, name: &str, value: i32) -> CompileResult<i32> {
    let value = self.ctx.symbols.set(name, value)?;
    let slot = self.slot_of(name);
    let reg = self.ctx.registers.top();
    trace!(op = op.symbol(), name, value, "store");
    self.push(Instruction::store(symbol::offset(slot), reg));
    Ok(value)
  }

  /// Fold the two newest registers and compute the matching value.
  ///
  /// A zero divisor is fatal only while the statement has not read any
  /// variable; after that the division is emitted and evaluates to 0.
  fn emit_binary(&mut self, op: BinaryOp, lhs: i32, rhs: i32) -> CompileResult<i32> {
    if op == BinaryOp::Div && rhs == 0 {
      ensure!(self.ctx.identifier_seen, DivideByZeroSnafu);
    }

    let (dst, src) = self.ctx.registers.combine();
    self.push(Instruction::Binary(op, dst, src));

    Ok(match op {
      BinaryOp::Add => lhs.wrapping_add(rhs),
      BinaryOp::Sub => lhs.wrapping_sub(rhs),
      BinaryOp::Mul => lhs.wrapping_mul(rhs),
      BinaryOp::Div if rhs == 0 => 0,
      BinaryOp::Div => lhs.wrapping_div(rhs),
      BinaryOp::And => lhs & rhs,
      BinaryOp::Or => lhs | rhs,
      BinaryOp::Xor => lhs ^ rhs,
    })
  }

  fn slot_of(&self, name: &str) -> usize {
    // `get`/`set` succeeded just before, so the name is bound.
    self.ctx.symbols.slot(name).unwrap_or_default()
  }
}
