//! # 16-bit Thumb decoding
//!
//! Dispatch is table-driven: every entry of [`TABLE`] masks the *first*
//! halfword of the instruction and the first matching entry decodes it. The
//! table order matters and the first match is authoritative; when its
//! handler rejects the pattern the instruction is data, and the scan does
//! not continue.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    16-bit Thumb Instruction Groups                      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  000x x           Shift by immediate, move register                    │
//! │  0001 10          Add/subtract register                                │
//! │  0001 11          Add/subtract immediate                               │
//! │  001x x           Add/subtract/compare/move immediate                  │
//! │  0100 00          Data processing register                             │
//! │  0100 01          Special data processing, branch/exchange             │
//! │  0100 1           Load from literal pool                               │
//! │  0101 x           Load/store register offset                           │
//! │  011x x           Load/store word/byte immediate offset                │
//! │  1000 x           Load/store halfword immediate offset                 │
//! │  1001 x           Load/store stack                                     │
//! │  1010 x           Add to SP or PC                                      │
//! │  1011 ...         Misc: stack adjust, extend, cbz/cbnz, push/pop,      │
//! │                   setend, cps, reverse, bkpt, IT/hints                 │
//! │  1100 x           Load/store multiple                                  │
//! │  1101 cond        Conditional branch, service call                     │
//! │  1110 0           Unconditional branch                                 │
//! │  111x ...         32-bit Thumb-2 prefixes (see [`crate::thumb2`])      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A halfword starts a 32-bit Thumb-2 instruction when its top three bits
//! are `111`, except for the 16-bit unconditional branch (`11100`).

use std::fmt::Write as _;

use crate::bitwise::{Bits, align4};
use crate::condition::Condition;
use crate::disasm::Disassembler;
use crate::pool::PoolKind;
use crate::registers::{REG_LR, REG_PC, register_name};
use crate::thumb2;

pub(crate) type Handler = fn(&mut Disassembler, u32) -> bool;

/// One row of the dispatch table: `halfword & mask == value` selects
/// `decode`.
pub(crate) struct Encoding16 {
    pub(crate) mask: u16,
    pub(crate) value: u16,
    pub(crate) decode: Handler,
}

/// True when `hw` is the first halfword of a 32-bit Thumb-2 instruction.
pub(crate) fn is_32bit(hw: u16) -> bool {
    if hw & 0xf800 == 0xe000 {
        return false; // 16-bit unconditional branch
    }
    hw & 0xe000 == 0xe000
}

/// Common part of the shift-by-immediate instructions.
fn shift_imm(state: &mut Disassembler, instr: u32, opcode: &str) -> bool {
    state.text.push_str(opcode);
    state.add_it_cond(true);
    state.pad_mnemonic();
    _ = write!(
        state.text,
        "{}, {}, #{}",
        register_name(instr.get_bits(0..=2)),
        register_name(instr.get_bits(3..=5)),
        instr.get_bits(6..=10)
    );
    state.size = 2;
    true
}

/// `0000 0xxx xxxx xxxx` - shift left by immediate, or move register.
fn lsl(state: &mut Disassembler, instr: u32) -> bool {
    if instr.get_bits(6..=10) == 0 {
        // lsl #0 is canonically a move
        state.text.push_str("movs");
        state.pad_mnemonic();
        _ = write!(
            state.text,
            "{}, {}",
            register_name(instr.get_bits(0..=2)),
            register_name(instr.get_bits(3..=5))
        );
        state.size = 2;
        return true;
    }
    shift_imm(state, instr, "lsl")
}

/// `0000 1xxx xxxx xxxx` - logical shift right by immediate.
fn lsr(state: &mut Disassembler, instr: u32) -> bool {
    shift_imm(state, instr, "lsr")
}

/// `0001 0xxx xxxx xxxx` - arithmetic shift right by immediate.
fn asr(state: &mut Disassembler, instr: u32) -> bool {
    shift_imm(state, instr, "asr")
}

/// `0001 10xx xxxx xxxx` - add/subtract register.
fn addsub_reg(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str(if instr.is_bit_on(9) { "sub" } else { "add" });
    state.add_it_cond(true);
    state.pad_mnemonic();
    _ = write!(
        state.text,
        "{}, {}, {}",
        register_name(instr.get_bits(0..=2)),
        register_name(instr.get_bits(3..=5)),
        register_name(instr.get_bits(6..=8))
    );
    state.size = 2;
    true
}

/// `0001 11xx xxxx xxxx` - add/subtract 3-bit immediate.
fn addsub_imm(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str(if instr.is_bit_on(9) { "sub" } else { "add" });
    state.add_it_cond(true);
    state.pad_mnemonic();
    let imm = instr.get_bits(6..=8);
    _ = write!(
        state.text,
        "{}, {}, #{imm}",
        register_name(instr.get_bits(0..=2)),
        register_name(instr.get_bits(3..=5))
    );
    state.append_comment_hex(imm);
    state.size = 2;
    true
}

/// `001x xxxx xxxx xxxx` - move/compare/add/subtract 8-bit immediate.
fn imm_op(state: &mut Disassembler, instr: u32) -> bool {
    const MNEMONICS: [&str; 4] = ["mov", "cmp", "add", "sub"];
    let opc = instr.get_bits(11..=12);
    state.text.push_str(MNEMONICS[opc as usize]);
    if opc != 1 {
        state.add_it_cond(true);
    }
    state.pad_mnemonic();
    let imm = instr.get_bits(0..=7);
    _ = write!(state.text, "{}, #{imm}", register_name(instr.get_bits(8..=10)));
    state.append_comment_hex(imm);
    state.size = 2;
    true
}

/// `0100 00xx xxxx xxxx` - data processing register (16 operations).
fn reg_op(state: &mut Disassembler, instr: u32) -> bool {
    const MNEMONICS: [&str; 16] = [
        "and", "eor", "lsl", "lsr", "asr", "adc", "sbc", "ror", "tst", "rsb", "cmp", "cmn", "orr",
        "mul", "bic", "mvn",
    ];
    let opc = instr.get_bits(6..=9);
    state.text.push_str(MNEMONICS[opc as usize]);
    // the comparisons never set a destination, so never print `s`
    state.add_it_cond(opc != 8 && opc != 10 && opc != 11);
    state.pad_mnemonic();
    _ = write!(
        state.text,
        "{}, {}",
        register_name(instr.get_bits(0..=2)),
        register_name(instr.get_bits(3..=5))
    );
    state.size = 2;
    true
}

/// `0100 01xx xxxx xxxx` (except `0111`) - add/compare/move on high
/// registers.
fn reg_op_hi(state: &mut Disassembler, instr: u32) -> bool {
    let opc = instr.get_bits(8..=9);
    state.text.push_str(match opc {
        0 => "add",
        1 => "cmp",
        _ => "mov",
    });
    state.add_it_cond(false);
    state.pad_mnemonic();
    let mut rd = instr.get_bits(0..=2);
    if instr.is_bit_on(7) {
        rd += 8;
    }
    let rm = instr.get_bits(3..=6);
    if opc == 0 && rm == 13 {
        _ = write!(state.text, "{}, sp, {}", register_name(rd), register_name(rd));
    } else {
        _ = write!(state.text, "{}, {}", register_name(rd), register_name(rm));
    }
    state.size = 2;
    true
}

/// `0100 0111 xxxx xxxx` - branch/exchange (bx/blx register).
fn branch_exch(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str(if instr.is_bit_on(7) { "blx" } else { "bx" });
    state.pad_mnemonic();
    state.text.push_str(register_name(instr.get_bits(3..=6)));
    state.size = 2;
    true
}

/// `0100 1xxx xxxx xxxx` - load from literal pool.
fn load_lit(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str("ldr");
    state.add_it_cond(false);
    state.pad_mnemonic();
    let offs = 4 * instr.get_bits(0..=7);
    _ = write!(state.text, "{}, [pc, #{offs}]", register_name(instr.get_bits(8..=10)));
    let target = align4(state.address.wrapping_add(4)).wrapping_add(offs);
    state.ldr_addr = Some(target);
    state.append_comment_hex(target);
    state.mark_address_type(target, PoolKind::Literal);
    state.size = 2;
    true
}

/// `0101 xxxx xxxx xxxx` - load/store with register offset.
fn loadstor_reg(state: &mut Disassembler, instr: u32) -> bool {
    const MNEMONICS: [&str; 8] = ["str", "strh", "strb", "ldrsb", "ldr", "ldrh", "ldrb", "ldrsh"];
    state.text.push_str(MNEMONICS[instr.get_bits(9..=11) as usize]);
    state.add_it_cond(false);
    state.pad_mnemonic();
    _ = write!(
        state.text,
        "{}, [{}, {}]",
        register_name(instr.get_bits(0..=2)),
        register_name(instr.get_bits(3..=5)),
        register_name(instr.get_bits(6..=8))
    );
    state.size = 2;
    true
}

/// `011x xxxx xxxx xxxx` - load/store word/byte with immediate offset.
fn loadstor_imm(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str(if instr.is_bit_on(11) { "ldr" } else { "str" });
    let mut offs = instr.get_bits(6..=10);
    if instr.is_bit_on(12) {
        state.text.push('b');
    } else {
        offs *= 4;
    }
    state.add_it_cond(false);
    state.pad_mnemonic();
    _ = write!(
        state.text,
        "{}, [{}, #{offs}]",
        register_name(instr.get_bits(0..=2)),
        register_name(instr.get_bits(3..=5))
    );
    state.append_comment_hex(offs);
    state.size = 2;
    true
}

/// `1000 xxxx xxxx xxxx` - load/store halfword with immediate offset.
fn loadstor_hw(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str(if instr.is_bit_on(11) { "ldrh" } else { "strh" });
    state.add_it_cond(false);
    state.pad_mnemonic();
    let offs = 2 * instr.get_bits(6..=10);
    _ = write!(
        state.text,
        "{}, [{}, #{offs}]",
        register_name(instr.get_bits(0..=2)),
        register_name(instr.get_bits(3..=5))
    );
    state.append_comment_hex(offs);
    state.size = 2;
    true
}

/// `1001 xxxx xxxx xxxx` - load from or store to the stack.
fn loadstor_stack(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str(if instr.is_bit_on(11) { "ldr" } else { "str" });
    state.add_it_cond(false);
    state.pad_mnemonic();
    let offs = 4 * instr.get_bits(0..=6);
    _ = write!(state.text, "{}, [sp, #{offs}]", register_name(instr.get_bits(8..=10)));
    state.append_comment_hex(offs);
    state.size = 2;
    true
}

/// `1010 xxxx xxxx xxxx` - add immediate to SP (`add Rd, sp, #imm`) or to
/// PC (`adr Rd, #imm`).
fn add_sp_pc_imm(state: &mut Disassembler, instr: u32) -> bool {
    let imm = 4 * instr.get_bits(0..=7);
    let rd = register_name(instr.get_bits(8..=10));
    if instr.is_bit_on(11) {
        state.text.push_str("add");
        state.add_it_cond(false);
        state.pad_mnemonic();
        _ = write!(state.text, "{rd}, sp, #{imm}");
        state.append_comment_hex(imm);
    } else {
        state.text.push_str("adr");
        state.add_it_cond(false);
        state.pad_mnemonic();
        _ = write!(state.text, "{rd}, #{imm}");
        // the target may be code or data, so it is not entered in the map
        state.append_comment_hex(align4(state.address.wrapping_add(4)).wrapping_add(imm));
    }
    state.size = 2;
    true
}

/// `1011 0000 xxxx xxxx` - adjust stack pointer.
fn adjust_sp(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str(if instr.is_bit_on(7) { "sub" } else { "add" });
    state.add_it_cond(false);
    state.pad_mnemonic();
    let imm = 4 * instr.get_bits(0..=6);
    _ = write!(state.text, "sp, #{imm}");
    state.append_comment_hex(imm);
    state.size = 2;
    true
}

/// `1011 0010 xxxx xxxx` - sign/zero extend.
fn sign_ext(state: &mut Disassembler, instr: u32) -> bool {
    const MNEMONICS: [&str; 4] = ["sxth", "sxtb", "uxth", "uxtb"];
    state.text.push_str(MNEMONICS[instr.get_bits(6..=7) as usize]);
    state.add_it_cond(false);
    state.pad_mnemonic();
    _ = write!(
        state.text,
        "{}, {}",
        register_name(instr.get_bits(0..=2)),
        register_name(instr.get_bits(3..=5))
    );
    state.size = 2;
    true
}

/// `1011 x0x1 xxxx xxxx` - compare and branch on (non-)zero.
fn cmp_branch(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str(if instr.is_bit_off(11) { "cbz" } else { "cbnz" });
    state.pad_mnemonic();
    let mut offs = instr.get_bits(3..=7);
    if instr.is_bit_on(9) {
        offs += 32;
    }
    let target = state.address.wrapping_add(4).wrapping_add(2 * offs);
    _ = write!(state.text, "{}, {target:07x}", register_name(instr.get_bits(0..=2)));
    state.mark_address_type(target, PoolKind::Code);
    state.size = 2;
    true
}

/// `1011 010x xxxx xxxx` - push register list.
fn push(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str("push");
    state.pad_mnemonic();
    let mut list = instr.get_bits(0..=7);
    if instr.is_bit_on(8) {
        list |= 1 << REG_LR;
    }
    if list == 0 {
        return false;
    }
    state.add_reglist(list);
    state.size = 2;
    true
}

/// `1011 110x xxxx xxxx` - pop register list.
fn pop(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str("pop");
    state.pad_mnemonic();
    let mut list = instr.get_bits(0..=7);
    if instr.is_bit_on(8) {
        list |= 1 << REG_PC;
    }
    if list == 0 {
        return false;
    }
    state.add_reglist(list);
    state.size = 2;
    true
}

/// `1011 0110 0101 xxxx` - set endianness.
fn set_endian(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str("setend");
    state.pad_mnemonic();
    state.text.push_str(if instr.is_bit_on(3) { "BE" } else { "LE" });
    state.size = 2;
    true
}

/// `1011 0110 011x 0xxx` - change processor state.
fn cpu_state(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str("cps");
    state.text.push_str(if instr.is_bit_off(4) { "ie" } else { "id" });
    state.pad_mnemonic();
    if instr.is_bit_on(2) {
        state.text.push('a');
    }
    if instr.is_bit_on(1) {
        state.text.push('i');
    }
    if instr.is_bit_on(0) {
        state.text.push('f');
    }
    state.size = 2;
    true
}

/// `1011 1010 xxxx xxxx` - reverse bytes.
fn reverse(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str(match instr.get_bits(6..=7) {
        0 => "rev",
        1 => "rev16",
        3 => "revsh",
        _ => return false,
    });
    state.add_it_cond(false);
    state.pad_mnemonic();
    _ = write!(
        state.text,
        "{}, {}",
        register_name(instr.get_bits(0..=2)),
        register_name(instr.get_bits(3..=5))
    );
    state.size = 2;
    true
}

/// `1011 1110 xxxx xxxx` - software breakpoint.
fn breakpoint(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str("bkpt");
    state.pad_mnemonic();
    _ = write!(state.text, "#{}", instr.get_bits(0..=7));
    state.size = 2;
    true
}

/// `1011 1111 xxxx xxxx` - `IT` blocks, or the NOP-compatible hints when
/// the mask nibble is zero.
fn if_then(state: &mut Disassembler, instr: u32) -> bool {
    let mut mask = instr & 0x0f;
    if mask == 0 {
        const MNEMONICS: [&str; 5] = ["nop", "yield", "wfe", "wfi", "sev"];
        let opc = instr.get_bits(4..=7);
        let Some(mnemonic) = MNEMONICS.get(opc as usize) else {
            return false;
        };
        state.text.push_str(mnemonic);
        state.add_it_cond(false);
    } else {
        let cond = instr.get_bits(4..=7);
        if cond >= 14 {
            return false;
        }
        // bit 4 carries the implied first-condition parity, bit 5 flags the
        // start of the block (the IT instruction itself)
        state.it_cond = cond as u16;
        state.it_mask = (mask as u16) | (((cond as u16) & 1) << 4) | 0x20;
        let mut count = 3;
        while mask & 1 == 0 {
            count -= 1;
            mask >>= 1;
        }
        mask = u32::from(state.it_mask) & 0x0f;
        state.text.push_str("it");
        for _ in 0..count {
            // rebuild the then/else letters relative to the first condition,
            // matching the objdump rendering
            if (mask >> 3) & 1 == cond & 1 {
                state.text.push('t');
            } else {
                state.text.push('e');
            }
            mask = (mask << 1) & 0x0f;
        }
        state.pad_mnemonic();
        _ = write!(state.text, "{}", Condition::from(cond as u8));
    }
    state.size = 2;
    true
}

/// `1100 xxxx xxxx xxxx` - load/store multiple.
fn loadstor_mul(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str(if instr.is_bit_on(11) { "ldmia" } else { "stmia" });
    state.add_it_cond(false);
    state.pad_mnemonic();

    let rn = instr.get_bits(8..=10);
    let list = instr.get_bits(0..=7);
    if list == 0 {
        return false;
    }
    state.text.push_str(register_name(rn));
    // stores always write back; loads only when the base is not reloaded
    if instr.is_bit_off(11) || list & (1 << rn) == 0 {
        state.text.push('!');
    }
    state.text.push_str(", ");
    state.add_reglist(list);
    state.size = 2;
    true
}

/// `1101 cccx xxxx xxxx` - conditional branch. The table carries seven rows
/// so that the service-call and undefined patterns (`1101 111x`) never
/// reach this handler.
fn cond_branch(state: &mut Disassembler, instr: u32) -> bool {
    let cond = instr.get_bits(8..=11);
    if cond >= 14 {
        return false;
    }
    state.text.push('b');
    state.add_condition(cond);
    state.pad_mnemonic();
    let offset = instr.get_bits(0..=7).sign_extended(8) as i32;
    let target = state.address.wrapping_add(4).wrapping_add((2 * offset) as u32);
    _ = write!(state.text, "{target:07x}");
    state.mark_address_type(target, PoolKind::Code);
    state.size = 2;
    true
}

/// `1101 1111 xxxx xxxx` - service (supervisor) call.
fn service(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str("svc");
    state.add_it_cond(false);
    state.pad_mnemonic();
    _ = write!(state.text, "#{}", instr.get_bits(0..=7));
    state.size = 2;
    true
}

/// `1110 0xxx xxxx xxxx` - unconditional branch.
fn branch(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push('b');
    state.add_it_cond(false);
    state.pad_mnemonic();
    let offset = instr.get_bits(0..=10).sign_extended(11) as i32;
    let target = state.address.wrapping_add(4).wrapping_add((2 * offset) as u32);
    _ = write!(state.text, "{target:07x}");
    state.mark_address_type(target, PoolKind::Code);
    state.size = 2;
    true
}

/// The ordered dispatch table. The VFP patch rows must precede the generic
/// Thumb-2 coprocessor rows, and the conditional-branch rows are split so
/// that `1101 111x` falls through to the service call.
pub(crate) static TABLE: &[Encoding16] = &[
    // exact-match patches for floating point extensions
    Encoding16 { mask: 0xffff, value: 0xee07, decode: thumb2::vmov_from },
    Encoding16 { mask: 0xffff, value: 0xee17, decode: thumb2::vmov_to },
    Encoding16 { mask: 0xffff, value: 0xeef1, decode: thumb2::vmrs },
    Encoding16 { mask: 0xffff, value: 0xee77, decode: thumb2::float_addsub },
    Encoding16 { mask: 0xffff, value: 0xee67, decode: thumb2::float_mul },
    Encoding16 { mask: 0xffff, value: 0xeec7, decode: thumb2::float_div },
    Encoding16 { mask: 0xffff, value: 0xeeb4, decode: thumb2::float_cmp },
    Encoding16 { mask: 0xffff, value: 0xeef8, decode: thumb2::int_to_float },
    Encoding16 { mask: 0xffff, value: 0xeefd, decode: thumb2::float_to_int },
    // 16-bit Thumb
    Encoding16 { mask: 0xf800, value: 0x0000, decode: lsl },
    Encoding16 { mask: 0xf800, value: 0x0800, decode: lsr },
    Encoding16 { mask: 0xf800, value: 0x1000, decode: asr },
    Encoding16 { mask: 0xfc00, value: 0x1800, decode: addsub_reg },
    Encoding16 { mask: 0xfc00, value: 0x1c00, decode: addsub_imm },
    Encoding16 { mask: 0xe000, value: 0x2000, decode: imm_op },
    Encoding16 { mask: 0xfc00, value: 0x4000, decode: reg_op },
    Encoding16 { mask: 0xff00, value: 0x4400, decode: reg_op_hi },
    Encoding16 { mask: 0xff00, value: 0x4500, decode: reg_op_hi },
    Encoding16 { mask: 0xff00, value: 0x4600, decode: reg_op_hi },
    Encoding16 { mask: 0xff00, value: 0x4700, decode: branch_exch },
    Encoding16 { mask: 0xf800, value: 0x4800, decode: load_lit },
    Encoding16 { mask: 0xf000, value: 0x5000, decode: loadstor_reg },
    Encoding16 { mask: 0xe000, value: 0x6000, decode: loadstor_imm },
    Encoding16 { mask: 0xf000, value: 0x8000, decode: loadstor_hw },
    Encoding16 { mask: 0xf000, value: 0x9000, decode: loadstor_stack },
    Encoding16 { mask: 0xf000, value: 0xa000, decode: add_sp_pc_imm },
    Encoding16 { mask: 0xff00, value: 0xb000, decode: adjust_sp },
    Encoding16 { mask: 0xff00, value: 0xb200, decode: sign_ext },
    Encoding16 { mask: 0xf500, value: 0xb100, decode: cmp_branch },
    Encoding16 { mask: 0xfe00, value: 0xb400, decode: push },
    Encoding16 { mask: 0xfe00, value: 0xbc00, decode: pop },
    Encoding16 { mask: 0xfff0, value: 0xb650, decode: set_endian },
    Encoding16 { mask: 0xffe8, value: 0xb660, decode: cpu_state },
    Encoding16 { mask: 0xff00, value: 0xba00, decode: reverse },
    Encoding16 { mask: 0xff00, value: 0xbe00, decode: breakpoint },
    Encoding16 { mask: 0xff00, value: 0xbf00, decode: if_then },
    Encoding16 { mask: 0xf000, value: 0xc000, decode: loadstor_mul },
    Encoding16 { mask: 0xfe00, value: 0xd000, decode: cond_branch },
    Encoding16 { mask: 0xfe00, value: 0xd200, decode: cond_branch },
    Encoding16 { mask: 0xfe00, value: 0xd400, decode: cond_branch },
    Encoding16 { mask: 0xfe00, value: 0xd600, decode: cond_branch },
    Encoding16 { mask: 0xfe00, value: 0xd800, decode: cond_branch },
    Encoding16 { mask: 0xfe00, value: 0xda00, decode: cond_branch },
    Encoding16 { mask: 0xfe00, value: 0xdc00, decode: cond_branch },
    Encoding16 { mask: 0xff00, value: 0xdf00, decode: service },
    Encoding16 { mask: 0xf800, value: 0xe000, decode: branch },
    // 32-bit Thumb-2
    Encoding16 { mask: 0xfe00, value: 0xea00, decode: thumb2::const_shift },
    Encoding16 { mask: 0xff80, value: 0xfa00, decode: thumb2::regshift_extend },
    Encoding16 { mask: 0xff80, value: 0xfa80, decode: thumb2::simd_misc },
    Encoding16 { mask: 0xff80, value: 0xfb00, decode: thumb2::mult32_acc },
    Encoding16 { mask: 0xff80, value: 0xfb80, decode: thumb2::mult64_acc },
    Encoding16 { mask: 0xf800, value: 0xf000, decode: thumb2::imm_branch_misc },
    Encoding16 { mask: 0xfe00, value: 0xf800, decode: thumb2::loadstor_single },
    Encoding16 { mask: 0xfe40, value: 0xe840, decode: thumb2::loadstor_dual_excl },
    Encoding16 { mask: 0xfe40, value: 0xe800, decode: thumb2::loadstor_mul },
    Encoding16 { mask: 0xee00, value: 0xec00, decode: thumb2::co_loadstor },
    Encoding16 { mask: 0xef10, value: 0xee00, decode: thumb2::co_dataproc },
    Encoding16 { mask: 0xef10, value: 0xee10, decode: thumb2::co_transfer },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disasm::Options;
    use pretty_assertions::assert_eq;

    fn decode(hw1: u16, hw2: u16) -> String {
        let mut disasm = Disassembler::new(Options::default());
        disasm.set_address(0x0800_0100);
        disasm.step_thumb(hw1, hw2);
        disasm.text().to_owned()
    }

    fn decode_commented(hw1: u16, hw2: u16) -> String {
        let mut disasm = Disassembler::new(Options {
            comments: true,
            ..Options::default()
        });
        disasm.set_address(0x0800_0100);
        disasm.step_thumb(hw1, hw2);
        disasm.text().to_owned()
    }

    #[test]
    fn prescan_finds_32bit_prefixes() {
        assert!(!is_32bit(0xe000)); // 16-bit unconditional branch
        assert!(!is_32bit(0xe7ff));
        assert!(is_32bit(0xe800));
        assert!(is_32bit(0xf000));
        assert!(is_32bit(0xfb00));
        assert!(!is_32bit(0x4770));
    }

    #[test]
    fn decode_shift_and_move() {
        assert_eq!(decode(0b0000_0_00000_001_010, 0), "movs    r2, r1");
        assert_eq!(decode(0b0000_0_00011_001_010, 0), "lsls    r2, r1, #3");
        assert_eq!(decode(0b0000_1_00111_001_010, 0), "lsrs    r2, r1, #7");
        assert_eq!(decode(0b0001_0_11111_001_010, 0), "asrs    r2, r1, #31");
    }

    #[test]
    fn decode_addsub() {
        assert_eq!(decode(0b0001_10_0_010_001_000, 0), "adds    r0, r1, r2");
        assert_eq!(decode(0b0001_10_1_010_001_000, 0), "subs    r0, r1, r2");
        assert_eq!(decode(0b0001_11_0_010_001_000, 0), "adds    r0, r1, #2");
        assert_eq!(decode_commented(0b0001_11_1_111_001_000, 0), "subs    r0, r1, #7");
    }

    #[test]
    fn decode_immediate_op() {
        assert_eq!(decode(0b001_00_000_00000001, 0), "movs    r0, #1");
        assert_eq!(decode(0b001_01_001_00000101, 0), "cmp     r1, #5");
        assert_eq!(
            decode_commented(0b001_10_010_11111111, 0),
            "adds    r2, #255        ; 0xff"
        );
        assert_eq!(decode(0b001_11_011_00001000, 0), "subs    r3, #8");
    }

    #[test]
    fn decode_register_op() {
        assert_eq!(decode(0b010000_0000_000_001, 0), "ands    r1, r0");
        assert_eq!(decode(0b010000_1000_111_110, 0), "tst     r6, r7");
        assert_eq!(decode(0b010000_1010_111_110, 0), "cmp     r6, r7");
        assert_eq!(decode(0b010000_1101_100_000, 0), "muls    r0, r4");
        assert_eq!(decode(0b010000_1111_001_111, 0), "mvns    r7, r1");
    }

    #[test]
    fn decode_high_register_op() {
        assert_eq!(decode(0b010001_00_0_1_000_001, 0), "add     r1, r8");
        assert_eq!(decode(0b010001_01_1_0_101_000, 0), "cmp     r8, r5");
        assert_eq!(decode(0b010001_10_0_1_110_000, 0), "mov     r0, lr");
        // add with sp as the source register keeps the three-operand form
        assert_eq!(decode(0b010001_00_1_1_101_000, 0), "add     r8, sp, r8");
    }

    #[test]
    fn decode_branch_exchange() {
        assert_eq!(decode(0x4770, 0), "bx      lr");
        assert_eq!(decode(0x4788, 0), "blx     r1");
    }

    #[test]
    fn decode_literal_load_marks_pool() {
        let mut disasm = Disassembler::new(Options {
            comments: true,
            ..Options::default()
        });
        disasm.set_address(0x0800_0100);
        assert!(disasm.step_thumb(0x4801, 0));
        assert_eq!(disasm.text(), "ldr     r0, [pc, #4]    ; 0x8000108");
        assert_eq!(disasm.address_type(0x0800_0108), PoolKind::Literal);
        assert_eq!(disasm.ldr_target(), Some(0x0800_0108));
    }

    #[test]
    fn literal_load_target_is_word_aligned() {
        let mut disasm = Disassembler::new(Options::default());
        disasm.set_address(0x0800_0102);
        // align4(0x08000106) + 8 = 0x0800010c
        assert!(disasm.step_thumb(0x4802, 0));
        assert_eq!(disasm.ldr_target(), Some(0x0800_010c));
    }

    #[test]
    fn decode_loadstor() {
        assert_eq!(decode(0b0101_000_000_001_010, 0), "str     r2, [r1, r0]");
        assert_eq!(decode(0b0101_100_011_001_010, 0), "ldr     r2, [r1, r3]");
        assert_eq!(decode(0b0101_011_011_001_010, 0), "ldrsb   r2, [r1, r3]");
        assert_eq!(decode(0b0110_1_00010_001_010, 0), "ldr     r2, [r1, #8]");
        assert_eq!(decode(0b0111_0_00111_110_101, 0), "strb    r5, [r6, #7]");
        assert_eq!(decode(0b1000_1_00001_000_001, 0), "ldrh    r1, [r0, #2]");
        assert_eq!(decode(0b1001_1_010_00000011, 0), "ldr     r2, [sp, #12]");
        assert_eq!(decode(0b1001_0_010_00000011, 0), "str     r2, [sp, #12]");
    }

    #[test]
    fn decode_add_sp_pc() {
        assert_eq!(decode(0b1010_1_000_00000010, 0), "add     r0, sp, #8");
        assert_eq!(
            decode_commented(0b1010_0_001_00000001, 0),
            "adr     r1, #4          ; 0x8000108"
        );
        assert_eq!(decode(0b1011_0000_0_0000101, 0), "add     sp, #20");
        assert_eq!(decode(0b1011_0000_1_0000101, 0), "sub     sp, #20");
    }

    #[test]
    fn decode_extend_and_reverse() {
        assert_eq!(decode(0b1011_0010_00_001_000, 0), "sxth    r0, r1");
        assert_eq!(decode(0b1011_0010_11_001_000, 0), "uxtb    r0, r1");
        assert_eq!(decode(0b1011_1010_00_001_000, 0), "rev     r0, r1");
        assert_eq!(decode(0b1011_1010_01_001_000, 0), "rev16   r0, r1");
        assert_eq!(decode(0b1011_1010_11_001_000, 0), "revsh   r0, r1");
    }

    #[test]
    fn decode_cmp_branch() {
        let mut disasm = Disassembler::new(Options::default());
        disasm.set_address(0x0800_0100);
        // cbz r3, 0x08000110: i=0, imm5=6
        assert!(disasm.step_thumb(0b1011_0_0_0_1_00110_011, 0));
        assert_eq!(disasm.text(), "cbz     r3, 8000110");
        assert_eq!(disasm.address_type(0x0800_0110), PoolKind::Code);
        // cbnz r3, 0x08000110
        let mut disasm = Disassembler::new(Options::default());
        disasm.set_address(0x0800_0100);
        assert!(disasm.step_thumb(0b1011_1_0_0_1_00110_011, 0));
        assert_eq!(disasm.text(), "cbnz    r3, 8000110");
    }

    #[test]
    fn decode_push_pop() {
        assert_eq!(decode(0xb510, 0), "push    {r4, lr}");
        assert_eq!(decode(0xb5f0, 0), "push    {r4-r7, lr}");
        assert_eq!(decode(0xbd10, 0), "pop     {r4, pc}");
        assert_eq!(decode(0xbc03, 0), "pop     {r0, r1}");
        // an empty register list is not a valid instruction
        assert_eq!(decode(0xb400, 0), ".hword  0xb400");
        assert_eq!(decode(0xbc00, 0), ".hword  0xbc00");
    }

    #[test]
    fn decode_misc_control() {
        assert_eq!(decode(0xb658, 0), "setend  BE");
        assert_eq!(decode(0xb650, 0), "setend  LE");
        assert_eq!(decode(0xb662, 0), "cpsie   i");
        assert_eq!(decode(0xb672, 0), "cpsid   i");
        assert_eq!(decode(0xb677, 0), "cpsid   aif");
        assert_eq!(decode(0xbe2a, 0), "bkpt    #42");
    }

    #[test]
    fn decode_hints() {
        assert_eq!(decode(0xbf00, 0), "nop");
        assert_eq!(decode(0xbf10, 0), "yield");
        assert_eq!(decode(0xbf20, 0), "wfe");
        assert_eq!(decode(0xbf30, 0), "wfi");
        assert_eq!(decode(0xbf40, 0), "sev");
        assert_eq!(decode(0xbf50, 0), ".hword  0xbf50");
    }

    #[test]
    fn decode_it_block_letters() {
        assert_eq!(decode(0xbf08, 0), "it      eq");
        assert_eq!(decode(0xbf0b, 0), "itete   eq");
        assert_eq!(decode(0xbf1f, 0), "itttt   ne");
        assert_eq!(decode(0xbf24, 0), "itt     cs");
    }

    #[test]
    fn it_block_folds_conditions_and_falls_off() {
        let mut disasm = Disassembler::new(Options::default());
        disasm.set_address(0x0800_0100);
        // itete eq
        assert!(disasm.step_thumb(0xbf0b, 0));
        assert_eq!(disasm.text(), "itete   eq");

        // mov r0, #0 -> then: eq, suppressing the `s`
        disasm.step_thumb(0x2000, 0);
        assert_eq!(disasm.text(), "moveq   r0, #0");
        // else: ne
        disasm.step_thumb(0x2001, 0);
        assert_eq!(disasm.text(), "movne   r0, #1");
        // then: eq
        disasm.step_thumb(0x2002, 0);
        assert_eq!(disasm.text(), "moveq   r0, #2");
        // else: ne
        disasm.step_thumb(0x2003, 0);
        assert_eq!(disasm.text(), "movne   r0, #3");
        // the window has closed
        disasm.step_thumb(0x2004, 0);
        assert_eq!(disasm.text(), "movs    r0, #4");
    }

    #[test]
    fn invalid_instruction_closes_it_block() {
        let mut disasm = Disassembler::new(Options::default());
        disasm.set_address(0x0800_0100);
        assert!(disasm.step_thumb(0xbf18, 0)); // it ne
        assert!(!disasm.step_thumb(0xde00, 0)); // undefined
        disasm.step_thumb(0x2000, 0);
        assert_eq!(disasm.text(), "movs    r0, #0");
    }

    #[test]
    fn decode_loadstor_multiple() {
        assert_eq!(decode(0xc9a0, 0), "ldmia   r1!, {r5, r7}");
        // a load that reloads its base register skips the writeback marker
        assert_eq!(decode(0xcda0, 0), "ldmia   r5, {r5, r7}");
        assert_eq!(decode(0xc107, 0), "stmia   r1!, {r0-r2}");
        assert_eq!(decode(0xc000, 0), ".hword  0xc000");
    }

    #[test]
    fn decode_branches() {
        let mut disasm = Disassembler::new(Options::default());
        disasm.set_address(0x0800_0100);
        // beq 0x08000108
        assert!(disasm.step_thumb(0xd002, 0));
        assert_eq!(disasm.text(), "beq     8000108");
        assert_eq!(disasm.address_type(0x0800_0108), PoolKind::Code);

        // backward branch: b 0x080000fa
        let mut disasm = Disassembler::new(Options::default());
        disasm.set_address(0x0800_0100);
        assert!(disasm.step_thumb(0xe7fb, 0));
        assert_eq!(disasm.text(), "b       80000fa");

        assert_eq!(decode(0xd0fe, 0), "beq     8000100");
        assert_eq!(decode(0xdf05, 0), "svc     #5");
    }
}
