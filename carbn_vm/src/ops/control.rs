//! Control-flow handlers: jumps, calls, returns, and the structured loop.

use crate::cursor::Cursor;
use crate::dispatch::ControlFlow;
use crate::frame::Frame;
use crate::opcode::{Opcode, Operand};
use crate::vm::VirtualMachine;
use carbn_core::{VmError, VmResult};

// =============================================================================
// Jumps
// =============================================================================

/// Jmp: unconditional jump to an absolute byte offset.
pub(crate) fn jmp(cursor: &mut Cursor<'_>) -> VmResult<()> {
    let target = cursor.read_u64()?;
    cursor.jump(target)
}

/// JmpIfFalse: pops the condition; jumps when it is falsy.
pub(crate) fn jmp_if_false(vm: &mut VirtualMachine, cursor: &mut Cursor<'_>) -> VmResult<()> {
    let target = cursor.read_u64()?;
    let condition = vm.stack.pop()?;
    if !condition.is_truthy() {
        cursor.jump(target)?;
    }
    Ok(())
}

/// JmpIfTrue: pops the condition; jumps when it is truthy.
pub(crate) fn jmp_if_true(vm: &mut VirtualMachine, cursor: &mut Cursor<'_>) -> VmResult<()> {
    let target = cursor.read_u64()?;
    let condition = vm.stack.pop()?;
    if condition.is_truthy() {
        cursor.jump(target)?;
    }
    Ok(())
}

// =============================================================================
// Calls
// =============================================================================

/// Call: jumps to the target and pushes a frame that resumes at the byte
/// after the operand, with an operand-stack-depth snapshot and empty
/// locals. Arguments stay on the operand stack for the callee's
/// prologue STOREs.
pub(crate) fn call(vm: &mut VirtualMachine, cursor: &mut Cursor<'_>) -> VmResult<()> {
    let target = cursor.read_u64()?;
    let return_address = cursor.pos();
    cursor.jump(target)?;
    vm.frames.push(Frame::new(return_address, vm.stack.len()));
    Ok(())
}

/// Ret: pops the top frame (dropping its locals) and resumes at its
/// return address. With no frame active, ends execution normally.
pub(crate) fn ret(vm: &mut VirtualMachine, cursor: &mut Cursor<'_>) -> VmResult<ControlFlow> {
    match vm.frames.pop() {
        Some(frame) => {
            cursor.set_pos(frame.return_address);
            Ok(ControlFlow::Continue)
        }
        None => Ok(ControlFlow::Halt),
    }
}

// =============================================================================
// Structured loop
// =============================================================================

/// LoopStart: reads `start` and `end`, locates the matching LoopEnd, and
/// runs the body once per index by re-entering the dispatch loop on the
/// body slice. The enclosing loop's index is saved and restored, so
/// nested loops each see their own counter. Execution resumes one byte
/// past the matching LoopEnd.
pub(crate) fn loop_start(vm: &mut VirtualMachine, cursor: &mut Cursor<'_>) -> VmResult<()> {
    let start = cursor.read_i64()?;
    let end = cursor.read_i64()?;
    let body_start = cursor.pos();
    let end_pos = find_loop_end(cursor.code(), body_start)?;
    let body = &cursor.code()[body_start..end_pos];

    let saved = vm.loop_index;
    let mut index = start;
    let result = loop {
        if index >= end {
            break Ok(());
        }
        vm.loop_index = index;
        if let Err(err) = vm.execute(body) {
            break Err(err);
        }
        index += 1;
    };
    vm.loop_index = saved;
    result?;

    cursor.set_pos(end_pos + 1);
    Ok(())
}

/// Find the matching LoopEnd for a body beginning at `from`.
///
/// The scan advances through whole instructions using the operand table,
/// so an immediate whose bytes happen to contain the LoopEnd value can
/// never be mistaken for a terminator. Nested LoopStarts increase the
/// depth; the LoopEnd at depth 0 is the match.
pub(crate) fn find_loop_end(code: &[u8], from: usize) -> VmResult<usize> {
    let mut cursor = Cursor::new(code);
    cursor.set_pos(from);
    let mut depth = 0usize;
    while !cursor.is_eof() {
        let at = cursor.pos();
        let byte = cursor.read_u8()?;
        let op = Opcode::from_byte(byte).ok_or(VmError::InvalidOpcode(byte))?;
        match op {
            Opcode::LoopEnd if depth == 0 => return Ok(at),
            Opcode::LoopEnd => depth -= 1,
            Opcode::LoopStart => depth += 1,
            _ => {}
        }
        skip_operands(&mut cursor, op)?;
    }
    Err(VmError::TruncatedCode {
        offset: code.len(),
        wanted: 1,
    })
}

fn skip_operands(cursor: &mut Cursor<'_>, op: Opcode) -> VmResult<()> {
    for operand in op.operands() {
        match operand {
            Operand::U64 | Operand::F64 => {
                cursor.skip(8)?;
            }
            Operand::Str => {
                let len = cursor.read_u8()? as usize;
                cursor.skip(len)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_loop_end_flat() {
        // LOAD_NULL POP LOOP_END
        let code = [38u8, 37, 5];
        assert_eq!(find_loop_end(&code, 0).unwrap(), 2);
    }

    #[test]
    fn test_find_loop_end_skips_immediates() {
        // LOAD_INT 5: the immediate's low byte equals the LoopEnd opcode.
        let mut code = vec![3u8];
        code.extend_from_slice(&5u64.to_be_bytes());
        code.push(5); // the real LOOP_END
        assert_eq!(find_loop_end(&code, 0).unwrap(), 9);
    }

    #[test]
    fn test_find_loop_end_skips_string_payloads() {
        // LOAD_CONST "\x05" carries the LoopEnd byte in its payload.
        let code = [2u8, 1, 5, 5];
        assert_eq!(find_loop_end(&code, 0).unwrap(), 3);
    }

    #[test]
    fn test_find_loop_end_nested() {
        // LOOP_START(0,1) LOOP_END LOOP_END: the inner pair nests.
        let mut code = vec![4u8];
        code.extend_from_slice(&0u64.to_be_bytes());
        code.extend_from_slice(&1u64.to_be_bytes());
        code.push(5);
        code.push(5);
        assert_eq!(find_loop_end(&code, 0).unwrap(), 18);
    }

    #[test]
    fn test_find_loop_end_missing() {
        let code = [38u8, 37];
        assert!(matches!(
            find_loop_end(&code, 0),
            Err(VmError::TruncatedCode { .. }),
        ));
    }
}
