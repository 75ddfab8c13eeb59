//! Central opcode dispatch.

use crate::cursor::Cursor;
use crate::opcode::Opcode;
use crate::ops;
use crate::vm::VirtualMachine;
use carbn_core::{VmError, VmResult};

/// What the dispatch loop should do after a handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    /// Keep executing at the cursor.
    Continue,
    /// End this execution normally (RET with no frame, or the end of a
    /// loop body).
    Halt,
}

/// Execute one decoded opcode.
pub(crate) fn dispatch(
    vm: &mut VirtualMachine,
    cursor: &mut Cursor<'_>,
    op: Opcode,
) -> VmResult<ControlFlow> {
    match op {
        // Data loads
        Opcode::LoadInt => ops::load_store::load_int(vm, cursor)?,
        Opcode::LoadFloat => ops::load_store::load_float(vm, cursor)?,
        Opcode::LoadBool => ops::load_store::load_bool(vm, cursor)?,
        Opcode::LoadConst => ops::load_store::load_const(vm, cursor)?,
        Opcode::LoadNull => ops::load_store::load_null(vm)?,
        Opcode::LoadVar => ops::load_store::load_var(vm, cursor)?,
        Opcode::Store => ops::load_store::store(vm, cursor)?,

        // Stack manipulation
        Opcode::Dup => ops::stack_ops::dup(vm)?,
        Opcode::Swap => ops::stack_ops::swap(vm)?,
        Opcode::Pop => ops::stack_ops::pop(vm)?,

        // I/O
        Opcode::Print => ops::print::print(vm)?,
        Opcode::Stdin => ops::print::stdin(vm)?,

        // Arithmetic
        Opcode::Add => ops::arithmetic::add(vm)?,
        Opcode::Sub => ops::arithmetic::sub(vm)?,
        Opcode::Mul => ops::arithmetic::mul(vm)?,
        Opcode::Div => ops::arithmetic::div(vm)?,
        Opcode::Mod => ops::arithmetic::modulo(vm)?,

        // Comparison
        Opcode::Eq => ops::comparison::eq(vm)?,
        Opcode::Ne => ops::comparison::ne(vm)?,
        Opcode::Lt => ops::comparison::lt(vm)?,
        Opcode::Le => ops::comparison::le(vm)?,
        Opcode::Gt => ops::comparison::gt(vm)?,
        Opcode::Ge => ops::comparison::ge(vm)?,

        // Logic
        Opcode::And => ops::logic::and(vm)?,
        Opcode::Or => ops::logic::or(vm)?,
        Opcode::Not => ops::logic::not(vm)?,
        Opcode::IsNull => ops::logic::is_null(vm)?,

        // Control flow
        Opcode::Jmp => ops::control::jmp(cursor)?,
        Opcode::JmpIfFalse => ops::control::jmp_if_false(vm, cursor)?,
        Opcode::JmpIfTrue => ops::control::jmp_if_true(vm, cursor)?,
        Opcode::Call => ops::control::call(vm, cursor)?,
        Opcode::Ret => return ops::control::ret(vm, cursor),
        Opcode::LoopStart => ops::control::loop_start(vm, cursor)?,
        Opcode::LoopEnd => return Ok(ControlFlow::Halt),

        // Aggregates
        Opcode::ArrayNew => ops::containers::array_new(vm)?,
        Opcode::BuildList => ops::containers::build_list(vm, cursor)?,
        Opcode::BuildTuple => ops::containers::build_tuple(vm, cursor)?,
        Opcode::BuildDict => ops::containers::build_dict(vm, cursor)?,
        Opcode::ArrayLen => ops::containers::array_len(vm)?,

        // Casts
        Opcode::CastInt => ops::casts::cast_int(vm)?,
        Opcode::CastFloat => ops::casts::cast_float(vm)?,

        // Reserved in the wire layout, never executable.
        Opcode::ArrayGet | Opcode::ArraySet => {
            return Err(VmError::InvalidOpcode(op as u8));
        }
    }
    Ok(ControlFlow::Continue)
}
