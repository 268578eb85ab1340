//! # 32-bit Thumb-2 decoding
//!
//! Handlers for the 32-bit encodings. Dispatch still happens on the first
//! halfword through the table in [`crate::thumb`]; the handlers here
//! receive the full word (`hw1` in the upper half, `hw2` in the lower) and
//! take apart the secondary fields themselves. Several handlers therefore
//! reject patterns that matched their table row but put reserved values in
//! the second halfword; the driver then emits the word as data.
//!
//! The fixed-operand `v...` handlers at the bottom are a patch set for the
//! small set of single-precision VFP instructions emitted by compilers for
//! Cortex-M4F soft-float shims. They match the first halfword exactly and
//! sit in front of the generic coprocessor rows.

use std::fmt::Write as _;

use crate::bitwise::{Bits, align4};
use crate::disasm::Disassembler;
use crate::immediate::expand_mod_imm;
use crate::pool::PoolKind;
use crate::registers::{REG_SP, register_name, special_register};
use crate::shift::{ShiftKind, decode_imm_shift};

/// `1110 101x xxxx xxxx` - data processing with constant shift.
pub(crate) fn const_shift(state: &mut Disassembler, instr: u32) -> bool {
    let rm = instr.get_bits(0..=3);
    let rd = instr.get_bits(8..=11);
    let rn = instr.get_bits(16..=19);
    let opc = instr.get_bits(21..=24);
    let shifttype = instr.get_bits(4..=5);
    let imm = (instr.get_bits(12..=14) << 2) | instr.get_bits(6..=7);
    let mut setflags = instr.is_bit_on(20);
    match opc {
        0 => {
            if rd == 15 && setflags {
                state.text.push_str("tst");
                setflags = false;
            } else {
                state.text.push_str("and");
            }
        }
        1 => state.text.push_str("bic"),
        2 => {
            if rn == 15 {
                match shifttype {
                    0 => state.text.push_str(if imm == 0 { "mov" } else { "lsl" }),
                    1 => state.text.push_str("lsr"),
                    2 => state.text.push_str("asr"),
                    _ => state.text.push_str(if imm == 0 { "rrx" } else { "ror" }),
                }
            } else {
                state.text.push_str("orr");
            }
        }
        3 => state.text.push_str(if rn == 15 { "mvn" } else { "orn" }),
        4 => {
            if rd == 15 && setflags {
                state.text.push_str("teq");
                setflags = false;
            } else {
                state.text.push_str("eor");
            }
        }
        6 => {
            if setflags {
                return false;
            }
            if shifttype == 0 {
                state.text.push_str("pkhbt");
            } else if shifttype == 2 {
                state.text.push_str("pkhtb");
            } else {
                return false;
            }
        }
        8 => {
            if rd == 15 && setflags {
                state.text.push_str("cmn");
                setflags = false;
            } else {
                state.text.push_str("add");
            }
        }
        10 => state.text.push_str("adc"),
        11 => state.text.push_str("sbc"),
        13 => {
            if rd == 15 && setflags {
                state.text.push_str("cmp");
                setflags = false;
            } else {
                state.text.push_str("sub");
            }
        }
        14 => state.text.push_str("rsb"),
        _ => return false,
    }
    if setflags {
        state.text.push('s');
    }
    state.add_it_cond(false);
    state.pad_mnemonic();

    if rd == 15 {
        _ = write!(state.text, "{}, {}", register_name(rn), register_name(rm));
    } else if rn == 15 {
        _ = write!(state.text, "{}, {}", register_name(rd), register_name(rm));
    } else {
        _ = write!(
            state.text,
            "{}, {}, {}",
            register_name(rd),
            register_name(rn),
            register_name(rm)
        );
    }
    if opc == 2 && rn == 15 {
        // the move/shift forms spell their count as a plain immediate
        if (shifttype != 0 && shifttype != 3) || imm != 0 {
            _ = write!(state.text, ", #{imm}");
        }
    } else if shifttype != 0 || imm != 0 {
        _ = write!(state.text, ", {}", decode_imm_shift(shifttype, imm));
    }

    state.size = 4;
    true
}

/// `1111 1010 0xxx xxxx` - register-controlled shift, or sign/zero
/// extension with optional addition (the two differ only in the second
/// halfword).
pub(crate) fn regshift_extend(state: &mut Disassembler, instr: u32) -> bool {
    if instr & 0x0000_f000 != 0x0000_f000 {
        return false;
    }
    let rn = instr.get_bits(16..=19);
    let rd = instr.get_bits(8..=11);
    let rm = instr.get_bits(0..=3);
    if instr.is_bit_on(7) {
        let opc = instr.get_bits(20..=22);
        let rot = instr.get_bits(4..=5);
        state.text.push_str(match opc {
            0 => {
                if rn == 15 {
                    "sxth"
                } else {
                    "sxtah"
                }
            }
            1 => {
                if rn == 15 {
                    "uxth"
                } else {
                    "uxtah"
                }
            }
            2 => {
                if rn == 15 {
                    "sxtb16"
                } else {
                    "sxtab16"
                }
            }
            3 => {
                if rn == 15 {
                    "uxtb16"
                } else {
                    "uxtab16"
                }
            }
            4 => {
                if rn == 15 {
                    "sxtb"
                } else {
                    "sxtab"
                }
            }
            5 => {
                if rn == 15 {
                    "uxtb"
                } else {
                    "uxtab"
                }
            }
            _ => return false,
        });
        state.add_it_cond(false);
        state.pad_mnemonic();
        if rn == 15 {
            _ = write!(state.text, "{}, {}", register_name(rd), register_name(rm));
        } else {
            _ = write!(
                state.text,
                "{}, {}, {}",
                register_name(rd),
                register_name(rn),
                register_name(rm)
            );
        }
        if rot != 0 {
            _ = write!(state.text, ", ror #{}", 8 * rot);
        }
    } else {
        if instr & 0x0000_0070 != 0 {
            return false;
        }
        _ = write!(state.text, "{}", ShiftKind::from(instr.get_bits(21..=22)));
        if instr.is_bit_on(20) {
            state.text.push('s');
        }
        state.add_it_cond(false);
        state.pad_mnemonic();
        _ = write!(
            state.text,
            "{}, {}, {}",
            register_name(rd),
            register_name(rn),
            register_name(rm)
        );
    }
    state.size = 4;
    true
}

/// `1111 1010 1xxx xxxx` - SIMD add/subtract, or the miscellaneous
/// three-register operations (again split by the second halfword).
pub(crate) fn simd_misc(state: &mut Disassembler, instr: u32) -> bool {
    if instr & 0x0000_f000 != 0x0000_f000 {
        return false;
    }
    let opc = instr.get_bits(20..=22);
    let rn = instr.get_bits(16..=19);
    let rd = instr.get_bits(8..=11);
    let rm = instr.get_bits(0..=3);
    let prefix = instr.get_bits(4..=6);
    let mut second_is_rm = false;
    if instr.is_bit_off(7) {
        state.text.push_str(match prefix {
            0 => "s",
            1 => "q",
            2 => "sh",
            4 => "u",
            5 => "uq",
            6 => "uh",
            _ => return false,
        });
        state.text.push_str(match opc {
            0 => "add8",
            1 => "add16",
            2 => "asx",
            4 => "sub8",
            5 => "sub16",
            6 => "sax",
            _ => return false,
        });
    } else {
        // a single operation code from op and op2, read as BCD
        match (prefix << 4) | opc {
            0x00 => state.text.push_str("qadd"),
            0x01 => {
                state.text.push_str("rev");
                second_is_rm = true;
            }
            0x02 => state.text.push_str("sel"),
            0x03 => {
                state.text.push_str("clz");
                second_is_rm = true;
            }
            0x10 => state.text.push_str("qdadd"),
            0x11 => {
                state.text.push_str("rev16");
                second_is_rm = true;
            }
            0x20 => state.text.push_str("qsub"),
            0x21 => {
                state.text.push_str("rbit");
                second_is_rm = true;
            }
            0x30 => state.text.push_str("qdsub"),
            0x31 => {
                state.text.push_str("revsh");
                second_is_rm = true;
            }
            _ => return false,
        }
    }
    state.add_it_cond(false);
    state.pad_mnemonic();
    if second_is_rm {
        _ = write!(state.text, "{}, {}", register_name(rd), register_name(rm));
    } else {
        _ = write!(
            state.text,
            "{}, {}, {}",
            register_name(rd),
            register_name(rn),
            register_name(rm)
        );
    }
    state.size = 4;
    true
}

/// `1111 1011 0xxx xxxx` - 32-bit multiplies and sum of absolute
/// differences, with or without accumulate.
pub(crate) fn mult32_acc(state: &mut Disassembler, instr: u32) -> bool {
    let opc = instr.get_bits(20..=22);
    let opc2 = instr.get_bits(4..=7);
    let rn = instr.get_bits(16..=19);
    let ra = instr.get_bits(12..=15);
    let rd = instr.get_bits(8..=11);
    let rm = instr.get_bits(0..=3);
    match opc {
        0 => match (opc2, ra) {
            (0, 15) => state.text.push_str("mul"),
            (0, _) => state.text.push_str("mla"),
            (1, ra) if ra != 15 => state.text.push_str("mls"),
            _ => return false,
        },
        1 => {
            if opc2 > 3 {
                return false;
            }
            state.text.push_str(if ra == 15 { "smul" } else { "smla" });
            state.text.push(if opc2 & 2 != 0 { 't' } else { 'b' });
            state.text.push(if opc2 & 1 != 0 { 't' } else { 'b' });
        }
        2 => {
            if opc2 > 1 {
                return false;
            }
            state.text.push_str(if ra == 15 { "smuad" } else { "smlad" });
            if opc2 == 1 {
                state.text.push('x');
            }
        }
        3 => {
            if opc2 > 1 {
                return false;
            }
            state.text.push_str(if ra == 15 { "smulw" } else { "smlaw" });
            state.text.push(if opc2 & 1 != 0 { 't' } else { 'b' });
        }
        4 => {
            if opc2 > 1 {
                return false;
            }
            state.text.push_str(if ra == 15 { "smusd" } else { "smlsd" });
            if opc2 == 1 {
                state.text.push('x');
            }
        }
        5 => {
            if opc2 > 1 {
                return false;
            }
            state.text.push_str(if ra == 15 { "smmul" } else { "smmla" });
            if opc2 == 1 {
                state.text.push('r');
            }
        }
        6 => {
            if opc2 > 1 || ra == 15 {
                return false;
            }
            state.text.push_str("smmls");
            if opc2 == 1 {
                state.text.push('r');
            }
        }
        _ => {
            if opc2 != 0 {
                return false;
            }
            state.text.push_str(if ra == 15 { "usad8" } else { "usada8" });
        }
    }
    state.add_it_cond(false);
    state.pad_mnemonic();
    if ra == 15 {
        _ = write!(
            state.text,
            "{}, {}, {}",
            register_name(rd),
            register_name(rn),
            register_name(rm)
        );
    } else {
        _ = write!(
            state.text,
            "{}, {}, {}, {}",
            register_name(rd),
            register_name(rn),
            register_name(rm),
            register_name(ra)
        );
    }
    state.size = 4;
    true
}

/// `1111 1011 1xxx xxxx` - 64-bit multiplies and multiply-accumulates,
/// divides.
pub(crate) fn mult64_acc(state: &mut Disassembler, instr: u32) -> bool {
    let opc = instr.get_bits(20..=22);
    let opc2 = instr.get_bits(4..=7);
    let rn = instr.get_bits(16..=19);
    let rdlo = instr.get_bits(12..=15);
    let rdhi = instr.get_bits(8..=11);
    let rm = instr.get_bits(0..=3);
    match opc {
        0 => {
            if opc2 != 0 {
                return false;
            }
            state.text.push_str("smull");
        }
        1 => {
            if opc2 != 15 {
                return false;
            }
            state.text.push_str("sdiv");
        }
        2 => {
            if opc2 != 0 {
                return false;
            }
            state.text.push_str("umull");
        }
        3 => {
            if opc2 != 15 {
                return false;
            }
            state.text.push_str("udiv");
        }
        4 => {
            state.text.push_str("smlal");
            if (0x08..0x0c).contains(&opc2) {
                state.text.push(if opc2 & 2 != 0 { 't' } else { 'b' });
                state.text.push(if opc2 & 1 != 0 { 't' } else { 'b' });
            } else if (0x0c..0x0e).contains(&opc2) {
                state.text.push('d');
                if opc2 & 1 != 0 {
                    state.text.push('x');
                }
            } else {
                return false;
            }
        }
        5 => {
            if !(0x0c..0x0e).contains(&opc2) {
                return false;
            }
            state.text.push_str("smlsld");
            if opc2 & 1 != 0 {
                state.text.push('x');
            }
        }
        6 => match opc2 {
            0 => state.text.push_str("umlal"),
            6 => state.text.push_str("umaal"),
            _ => return false,
        },
        _ => return false,
    }
    state.add_it_cond(false);
    state.pad_mnemonic();
    if rdlo == 15 {
        _ = write!(
            state.text,
            "{}, {}, {}",
            register_name(rdhi),
            register_name(rn),
            register_name(rm)
        );
    } else {
        _ = write!(
            state.text,
            "{}, {}, {}, {}",
            register_name(rdlo),
            register_name(rdhi),
            register_name(rn),
            register_name(rm)
        );
    }
    state.size = 4;
    true
}

/// `1111 0xxx xxxx xxxx` - data processing with immediates, branches and
/// miscellaneous control. The largest block: plain and modified
/// immediates, bitfields and saturation, `b`/`bl`/`blx`, `msr`/`mrs`,
/// hints, barriers and `smc`.
#[allow(clippy::too_many_lines)]
pub(crate) fn imm_branch_misc(state: &mut Disassembler, instr: u32) -> bool {
    if instr.is_bit_on(15) {
        if instr & 0x0000_5000 != 0 {
            // unconditional branches
            let offs1 = instr.get_bits(0..=10);
            let offs2 = instr.get_bits(16..=25);
            let j1 = instr.get_bits(13..=13);
            let j2 = instr.get_bits(11..=11);
            let s = instr.get_bits(26..=26);
            let i1 = !(j1 ^ s) & 0x01;
            let i2 = !(j2 ^ s) & 0x01;
            let mut offset = (offs1 << 1) | (offs2 << 12) | (i2 << 22) | (i1 << 23);
            if s != 0 {
                offset |= 0xff00_0000;
            }
            let opc = instr.get_bits(12..=14) & 0x05;
            match opc {
                1 => state.text.push('b'),
                4 => {
                    if instr & 0x01 != 0 {
                        return false; // the switch to ARM needs an aligned target
                    }
                    state.text.push_str("blx");
                }
                5 => state.text.push_str("bl"),
                _ => return false,
            }
            state.add_it_cond(false);
            state.pad_mnemonic();
            let mut target = state.address.wrapping_add(4);
            if opc == 4 {
                target = align4(target); // BLX targets a 32-bit aligned address
            }
            let target = target.wrapping_add(offset);
            _ = write!(state.text, "{target:07x}");
            state.append_comment_symbol(target);
            state.mark_address_type(target, PoolKind::Code);
        } else if instr.get_bits(22..=25) < 14 {
            // conditional branch
            let offs1 = instr.get_bits(0..=10);
            let offs2 = instr.get_bits(16..=21);
            let j1 = instr.get_bits(13..=13);
            let j2 = instr.get_bits(11..=11);
            let s = instr.get_bits(26..=26);
            let mut offset = (offs1 << 1) | (offs2 << 12) | (j2 << 18) | (j1 << 19);
            if s != 0 {
                offset |= 0xfff0_0000;
            }
            state.text.push('b');
            state.add_condition(instr.get_bits(22..=25));
            state.pad_mnemonic();
            let target = state.address.wrapping_add(4).wrapping_add(offset);
            _ = write!(state.text, "{target:07x}");
            state.append_comment_symbol(target);
            state.mark_address_type(target, PoolKind::Code);
        } else if instr.is_bit_on(26) {
            // secure monitor call
            if instr.get_bits(12..=15) != 8 {
                return false;
            }
            state.text.push_str("smc");
            state.add_it_cond(false);
            state.pad_mnemonic();
            let imm = instr.get_bits(16..=19);
            _ = write!(state.text, "#{imm}");
            state.append_comment_hex(imm);
        } else {
            match instr.get_bits(21..=22) {
                0 => {
                    state.text.push_str("msr");
                    state.add_it_cond(false);
                    state.pad_mnemonic();
                    _ = write!(
                        state.text,
                        "{}, {}",
                        special_register(instr & 0xff, instr.get_bits(8..=11)),
                        register_name(instr.get_bits(16..=19))
                    );
                }
                1 => {
                    if instr.get_bits(8..=10) == 0 {
                        // nop-compatible hints and dbg
                        const MNEMONICS: [&str; 5] = ["nop", "yield", "wfe", "wfi", "sev"];
                        let opc = instr.get_bits(0..=7);
                        if opc & 0xf0 == 0xf0 {
                            state.text.push_str("dbg");
                            state.add_it_cond(false);
                            state.pad_mnemonic();
                            _ = write!(state.text, "#{}", instr.get_bits(0..=3));
                        } else if let Some(mnemonic) = MNEMONICS.get(opc as usize) {
                            state.text.push_str(mnemonic);
                            state.add_it_cond(false);
                        } else {
                            return false;
                        }
                    } else {
                        // special control (barrier) operations
                        state.text.push_str(match instr.get_bits(4..=7) {
                            2 => "clrex",
                            4 => "dsb",
                            5 => "dmb",
                            6 => "isb",
                            _ => return false,
                        });
                        state.add_it_cond(false);
                    }
                }
                2 => {
                    // exception return, branch & change to Java
                    if instr.is_bit_on(20) {
                        state.text.push_str("subs");
                        state.add_it_cond(false);
                        state.pad_mnemonic();
                        _ = write!(state.text, "pc, lr, #{}", instr.get_bits(0..=7));
                    } else {
                        state.text.push_str("bxj");
                        state.add_it_cond(false);
                        state.pad_mnemonic();
                        state.text.push_str(register_name(instr.get_bits(16..=19)));
                    }
                }
                _ => {
                    state.text.push_str("mrs");
                    state.add_it_cond(false);
                    state.pad_mnemonic();
                    _ = write!(
                        state.text,
                        "{}, {}",
                        register_name(instr.get_bits(8..=11)),
                        special_register(instr & 0xff, 0)
                    );
                }
            }
        }
    } else {
        // operations using immediates, including bitfields and saturation
        let imm8 = instr.get_bits(0..=7);
        let imm3 = instr.get_bits(12..=14);
        let imm1 = instr.get_bits(26..=26);
        let rd = instr.get_bits(8..=11);
        let rn = instr.get_bits(16..=19);
        if instr & 0x0200_8000 == 0 {
            // data processing, modified 12-bit immediate
            let opc = instr.get_bits(21..=24);
            let imm = expand_mod_imm(imm1, imm3, imm8);
            let mut rd = Some(rd);
            let mut rn = Some(rn);
            let setflags = instr.is_bit_on(20);
            match opc {
                0 => {
                    if setflags && rd == Some(15) {
                        state.text.push_str("tst");
                        rd = None;
                    } else {
                        state.text.push_str("and");
                    }
                }
                1 => state.text.push_str("bic"),
                2 => {
                    if rn == Some(15) {
                        state.text.push_str("mov");
                        rn = None;
                    } else {
                        state.text.push_str("orr");
                    }
                }
                3 => {
                    if rn == Some(15) {
                        state.text.push_str("mvn");
                        rn = None;
                    } else {
                        state.text.push_str("orn");
                    }
                }
                4 => {
                    if setflags && rd == Some(15) {
                        state.text.push_str("teq");
                        rd = None;
                    } else {
                        state.text.push_str("eor");
                    }
                }
                8 => {
                    if setflags && rd == Some(15) {
                        state.text.push_str("cmn");
                        rd = None;
                    } else {
                        state.text.push_str("add");
                    }
                }
                10 => state.text.push_str("adc"),
                11 => state.text.push_str("sbc"),
                13 => {
                    if setflags && rd == Some(15) {
                        state.text.push_str("cmp");
                        rd = None;
                    } else {
                        state.text.push_str("sub");
                    }
                }
                14 => state.text.push_str("rsb"),
                _ => return false,
            }
            if setflags && rd.is_some() {
                state.text.push('s');
            }
            state.add_it_cond(false);
            state.pad_mnemonic();
            match (rd, rn) {
                (Some(rd), Some(rn)) => {
                    _ = write!(state.text, "{}, {}, #{imm}", register_name(rd), register_name(rn));
                }
                (None, Some(rn)) => {
                    _ = write!(state.text, "{}, #{imm}", register_name(rn));
                }
                (Some(rd), None) => {
                    _ = write!(state.text, "{}, #{imm}", register_name(rd));
                }
                (None, None) => unreachable!(),
            }
            state.append_comment_hex(imm as u32);
        } else if instr & 0x0340_8000 == 0x0200_0000 {
            // add/subtract, plain 12-bit immediate (and the adr forms)
            let imm = (imm1 << 11) | (imm3 << 8) | imm8;
            let subtract = match instr.get_bits(20..=24) {
                0b00000 => false,
                0b01010 => true,
                _ => return false,
            };
            if rn == 15 {
                state.text.push_str("adr");
                state.add_it_cond(false);
                state.pad_mnemonic();
                let base = align4(state.address.wrapping_add(4));
                let target = if subtract {
                    base.wrapping_sub(imm)
                } else {
                    base.wrapping_add(imm)
                };
                _ = write!(state.text, "{}, {target:07x}", register_name(rd));
                state.append_comment_symbol(target);
            } else {
                state.text.push_str(if subtract { "subw" } else { "addw" });
                state.add_it_cond(false);
                state.pad_mnemonic();
                _ = write!(state.text, "{}, {}, #{imm}", register_name(rd), register_name(rn));
                state.append_comment_hex(imm);
            }
        } else if instr & 0x0340_8000 == 0x0240_0000 {
            // move, plain 16-bit immediate (low or high half)
            let imm = (rn << 12) | (imm1 << 11) | (imm3 << 8) | imm8;
            state.text.push_str(if instr.is_bit_on(23) { "movt" } else { "movw" });
            state.add_it_cond(false);
            state.pad_mnemonic();
            _ = write!(state.text, "{}, #{imm}", register_name(rd));
            state.append_comment_hex(imm);
        } else if instr & 0x0310_8000 == 0x0300_0000 {
            // bit-field operations, saturation with shift
            let lsb = (imm3 << 2) | instr.get_bits(6..=7);
            let msb = instr.get_bits(0..=4);
            let opc = instr.get_bits(21..=23);
            let saturate16 = (opc == 1 || opc == 5) && lsb == 0;
            match opc {
                0 | 1 => {
                    state.text.push_str("ssat");
                    if saturate16 {
                        state.text.push_str("16");
                    }
                }
                2 => state.text.push_str("sbfx"),
                3 => state.text.push_str(if rn == 15 { "bfc" } else { "bfi" }),
                4 | 5 => {
                    state.text.push_str("usat");
                    if saturate16 {
                        state.text.push_str("16");
                    }
                }
                6 => state.text.push_str("ubfx"),
                _ => return false,
            }
            state.add_it_cond(false);
            state.pad_mnemonic();
            match opc {
                0 | 1 | 4 | 5 => {
                    _ = write!(
                        state.text,
                        "{}, #{}, {}",
                        register_name(rd),
                        msb + 1,
                        register_name(rn)
                    );
                    let shifttype = if instr.is_bit_on(21) { 2 } else { 0 };
                    if !saturate16 && (shifttype != 0 || lsb != 0) {
                        _ = write!(state.text, ", {}", decode_imm_shift(shifttype, lsb));
                    }
                }
                2 | 6 => {
                    _ = write!(
                        state.text,
                        "{}, {}, #{lsb}, #{}",
                        register_name(rd),
                        register_name(rn),
                        msb + 1
                    );
                }
                _ => {
                    // msb below lsb is unpredictable; the width just goes
                    // negative like binutils prints it
                    let width = msb as i32 - lsb as i32 + 1;
                    if rn == 15 {
                        _ = write!(state.text, "{}, #{lsb}, #{width}", register_name(rd));
                    } else {
                        _ = write!(
                            state.text,
                            "{}, {}, #{lsb}, #{width}",
                            register_name(rd),
                            register_name(rn)
                        );
                    }
                }
            }
        } else {
            return false;
        }
    }
    state.size = 4;
    true
}

/// `1111 100x xxxx xxxx` - load and store single data item, memory hints.
pub(crate) fn loadstor_single(state: &mut Disassembler, instr: u32) -> bool {
    let rt = instr.get_bits(12..=15);
    let rn = instr.get_bits(16..=19);
    let size = instr.get_bits(21..=22); // 0 -> b, 1 -> h, 2 -> w
    let mut imm: i32 = 0;
    let mut index = true;
    let mut writeback = false;
    let mut upwards = true;
    let mut reg_offset: Option<(u32, u32)> = None;
    if instr.is_bit_on(23) || rn == 15 {
        imm = instr.get_bits(0..=11) as i32;
        if rn == 15 {
            upwards = instr.is_bit_on(23); // 'U' flag for the literal form
        }
    } else if instr.is_bit_on(11) {
        imm = instr.get_bits(0..=7) as i32;
        upwards = instr.is_bit_on(9);
        index = instr.is_bit_on(10);
        writeback = instr.is_bit_on(8);
    } else {
        if instr & 0x0000_07c0 != 0 {
            return false;
        }
        reg_offset = Some((instr.get_bits(0..=3), instr.get_bits(4..=5)));
    }
    if !upwards {
        imm = -imm;
    }
    if instr.is_bit_on(24) && size == 2 {
        return false; // no sign-extending word loads
    }

    let mut hint = false;
    if instr.is_bit_on(20) {
        if size == 0 && rt == 15 {
            hint = true;
            state.text.push_str(if instr.is_bit_off(24) { "pld" } else { "pli" });
        } else {
            state.text.push_str("ldr");
            if instr.is_bit_off(23) && instr.is_bit_on(11) && index && upwards && !writeback {
                state.text.push('t');
            }
        }
    } else {
        state.text.push_str("str");
    }
    if !hint {
        if size != 2 && instr.is_bit_on(24) {
            state.text.push('s');
        }
        if size == 0 {
            state.text.push('b');
        } else if size == 1 {
            state.text.push('h');
        }
    }
    state.add_it_cond(false);
    state.pad_mnemonic();

    if !hint {
        _ = write!(state.text, "{}, ", register_name(rt));
    }
    if rn == 15 {
        _ = write!(state.text, "[pc, #{imm}]");
        let target = align4(state.address.wrapping_add(4)).wrapping_add(imm as u32);
        state.ldr_addr = Some(target);
        state.append_comment_hex(target);
        state.mark_address_type(target, PoolKind::Literal);
    } else if let Some((rm, shift)) = reg_offset {
        _ = write!(
            state.text,
            "[{}, {}, lsl #{shift}]",
            register_name(rn),
            register_name(rm)
        );
    } else if index {
        _ = write!(state.text, "[{}, #{imm}]", register_name(rn));
        if writeback {
            state.text.push('!');
        }
        state.append_comment_hex(imm as u32);
    } else if writeback || imm != 0 {
        _ = write!(state.text, "[{}], #{imm}", register_name(rn));
        state.append_comment_hex(imm as u32);
    } else {
        _ = write!(state.text, "[{}]", register_name(rn));
    }
    state.size = 4;
    true
}

/// `1110 100x x1xx xxxx` - load/store double and exclusive, table branch.
pub(crate) fn loadstor_dual_excl(state: &mut Disassembler, instr: u32) -> bool {
    let rn = instr.get_bits(16..=19);
    let rt = instr.get_bits(12..=15);
    let rt2 = instr.get_bits(8..=11);
    let low8 = instr.get_bits(0..=7);
    if instr & 0x0120_0000 != 0 {
        // load and store double
        let load = instr.is_bit_on(20);
        state.text.push_str(if load { "ldrd" } else { "strd" });
        state.add_it_cond(false);
        state.pad_mnemonic();
        let mut imm = (low8 * 4) as i32;
        if instr.is_bit_off(23) {
            imm = -imm;
        }
        if load && rn == 15 {
            let target = align4(state.address.wrapping_add(4)).wrapping_add(imm as u32);
            state.ldr_addr = Some(target);
            state.mark_address_type(target, PoolKind::Literal);
        }
        if instr.is_bit_on(24) || instr.is_bit_off(21) {
            if instr.is_bit_off(24) || imm == 0 {
                _ = write!(
                    state.text,
                    "{}, {}, [{}]",
                    register_name(rt),
                    register_name(rt2),
                    register_name(rn)
                );
            } else {
                _ = write!(
                    state.text,
                    "{}, {}, [{}, #{imm}]",
                    register_name(rt),
                    register_name(rt2),
                    register_name(rn)
                );
                if instr.is_bit_on(21) {
                    state.text.push('!');
                }
                state.append_comment_hex(imm as u32);
            }
        } else {
            _ = write!(
                state.text,
                "{}, {}, [{}], #{imm}",
                register_name(rt),
                register_name(rt2),
                register_name(rn)
            );
            state.append_comment_hex(imm as u32);
        }
    } else if instr.is_bit_off(23) {
        // load and store exclusive
        let load = instr.is_bit_on(20);
        state.text.push_str(if load { "ldrex" } else { "strex" });
        state.add_it_cond(false);
        state.pad_mnemonic();
        let imm = low8 * 4;
        let offset = if imm == 0 {
            String::new()
        } else {
            format!(", #{imm}")
        };
        if load {
            _ = write!(state.text, "{}, [{}{offset}]", register_name(rt), register_name(rn));
        } else {
            _ = write!(
                state.text,
                "{}, {}, [{}{offset}]",
                register_name(rt2),
                register_name(rt),
                register_name(rn)
            );
        }
        if imm != 0 {
            state.append_comment_hex(imm);
        }
    } else {
        // exclusive byte/halfword/doubleword, table branch
        let rd = low8 & 0x0f;
        let rm = instr.get_bits(0..=3);
        let load = instr.is_bit_on(20);
        match low8 >> 4 {
            0 => {
                state.text.push_str("tbb");
                state.pad_mnemonic();
                _ = write!(state.text, "[{}, {}]", register_name(rn), register_name(rm));
            }
            1 => {
                state.text.push_str("tbh");
                state.pad_mnemonic();
                _ = write!(state.text, "[{}, {}, lsl #1]", register_name(rn), register_name(rm));
            }
            4 | 5 => {
                let half = low8 >> 4 == 5;
                state
                    .text
                    .push_str(match (load, half) {
                        (true, false) => "ldrexb",
                        (true, true) => "ldrexh",
                        (false, false) => "strexb",
                        (false, true) => "strexh",
                    });
                state.add_it_cond(false);
                state.pad_mnemonic();
                if load {
                    _ = write!(state.text, "{}, [{}]", register_name(rt), register_name(rn));
                } else {
                    _ = write!(
                        state.text,
                        "{}, {}, [{}]",
                        register_name(rd),
                        register_name(rt),
                        register_name(rn)
                    );
                }
            }
            7 => {
                state.text.push_str(if load { "ldrexd" } else { "strexd" });
                state.add_it_cond(false);
                state.pad_mnemonic();
                if load {
                    _ = write!(
                        state.text,
                        "{}, {}, [{}]",
                        register_name(rt),
                        register_name(rt2),
                        register_name(rn)
                    );
                } else {
                    _ = write!(
                        state.text,
                        "{}, {}, {}, [{}]",
                        register_name(rd),
                        register_name(rt),
                        register_name(rt2),
                        register_name(rn)
                    );
                }
            }
            _ => return false,
        }
    }
    state.size = 4;
    true
}

/// `1110 100x x0xx xxxx` - load/store multiple, `rfe` and `srs`.
pub(crate) fn loadstor_mul(state: &mut Disassembler, instr: u32) -> bool {
    let cat = instr.get_bits(23..=24);
    if cat == 1 || cat == 2 {
        let rn = instr.get_bits(16..=19);
        let list = (instr & 0xffff) & !(1 << 13); // sp never appears in the list
        let load = instr.is_bit_on(20);
        let decrement = cat == 2;
        // pop is ldmia sp! and push is stmdb sp!, direction included
        let alias = rn == REG_SP && instr.is_bit_on(21) && (load != decrement);
        if alias {
            state.text.push_str(if load { "pop" } else { "push" });
        } else {
            state.text.push_str(if load { "ldm" } else { "stm" });
            state.text.push_str(if decrement { "db" } else { "ia" });
        }
        state.add_it_cond(false);
        state.pad_mnemonic();
        if !alias {
            state.text.push_str(register_name(rn));
            if instr.is_bit_on(21) {
                state.text.push('!');
            }
            state.text.push_str(", ");
        }
        state.add_reglist(list);
    } else if instr.is_bit_on(20) {
        state.text.push_str("rfe");
        state.text.push_str(if cat == 0 { "db" } else { "ia" });
        state.add_it_cond(false);
        state.pad_mnemonic();
        state.text.push_str(register_name(instr.get_bits(16..=19)));
        if instr.is_bit_on(21) {
            state.text.push('!');
        }
    } else {
        state.text.push_str("srs");
        state.text.push_str(if cat == 0 { "db" } else { "ia" });
        state.add_it_cond(false);
        state.pad_mnemonic();
        _ = write!(state.text, "#{}", instr.get_bits(0..=4));
        if instr.is_bit_on(21) {
            state.text.push('!');
        }
    }
    state.size = 4;
    true
}

/// `111x 110x xxxx xxxx` - coprocessor load/store and the `mcrr`/`mrrc`
/// double register transfers.
pub(crate) fn co_loadstor(state: &mut Disassembler, instr: u32) -> bool {
    let opc = instr.get_bits(21..=24);
    if opc == 2 {
        state.text.push_str(if instr.is_bit_on(20) { "mrrc" } else { "mcrr" });
    } else if opc != 0 {
        state.text.push_str(if instr.is_bit_on(20) { "ldc" } else { "stc" });
    } else {
        return false;
    }
    if instr.is_bit_on(28) {
        state.text.push('2');
    }
    if opc != 2 && instr.is_bit_on(22) {
        state.text.push('l');
    }
    state.add_it_cond(false);
    state.pad_mnemonic();
    if opc == 2 {
        _ = write!(
            state.text,
            "{}, {}, {}, {}, cr{}",
            instr.get_bits(8..=11),
            instr.get_bits(4..=7),
            register_name(instr.get_bits(12..=15)),
            register_name(instr.get_bits(16..=19)),
            instr.get_bits(0..=3)
        );
    } else {
        let mut imm = (4 * instr.get_bits(0..=7)) as i32;
        if instr.is_bit_off(23) {
            imm = -imm;
        }
        let rn = register_name(instr.get_bits(16..=19));
        if instr.is_bit_on(24) {
            _ = write!(
                state.text,
                "{}, cr{}, [{rn}, #{imm}]",
                instr.get_bits(8..=11),
                instr.get_bits(12..=15)
            );
            if instr.is_bit_on(21) {
                state.text.push('!');
            }
        } else {
            _ = write!(
                state.text,
                "{}, cr{}, [{rn}], #{imm}",
                instr.get_bits(8..=11),
                instr.get_bits(12..=15)
            );
        }
    }
    state.size = 4;
    true
}

/// Shared by the two coprocessor rows below: bit 4 of the second halfword
/// separates `cdp` (clear) from the `mcr`/`mrc` register transfers (set);
/// the table rows themselves only see the first halfword, which splits on
/// bit 20 instead.
fn co_proc(state: &mut Disassembler, instr: u32) -> bool {
    if instr.is_bit_on(4) {
        // mcr and mrc coprocessor register transfers
        state.text.push_str(if instr.is_bit_on(20) { "mrc" } else { "mcr" });
        if instr.is_bit_on(28) {
            state.text.push('2');
        }
        state.add_it_cond(false);
        state.pad_mnemonic();
        let rt = instr.get_bits(12..=15);
        let rt_name = if rt == 15 { "APSR_nzcv" } else { register_name(rt) };
        _ = write!(
            state.text,
            "{}, {}, {rt_name}, cr{}, cr{}, {{{}}}",
            instr.get_bits(8..=11),
            instr.get_bits(21..=23),
            instr.get_bits(16..=19),
            instr.get_bits(0..=3),
            instr.get_bits(5..=7)
        );
    } else {
        state.text.push_str("cdp");
        if instr.is_bit_on(28) {
            state.text.push('2');
        }
        state.add_it_cond(false);
        state.pad_mnemonic();
        _ = write!(
            state.text,
            "{}, {}, cr{}, cr{}, cr{}, {{{}}}",
            instr.get_bits(8..=11),
            instr.get_bits(20..=23),
            instr.get_bits(12..=15),
            instr.get_bits(16..=19),
            instr.get_bits(0..=3),
            instr.get_bits(5..=7)
        );
    }
    state.size = 4;
    true
}

/// `111x 1110 xxx0 xxxx` - coprocessor: `cdp` with an even opc1, or `mcr`.
pub(crate) fn co_dataproc(state: &mut Disassembler, instr: u32) -> bool {
    co_proc(state, instr)
}

/// `111x 1110 xxx1 xxxx` - coprocessor: `cdp` with an odd opc1, or `mrc`.
pub(crate) fn co_transfer(state: &mut Disassembler, instr: u32) -> bool {
    co_proc(state, instr)
}

// ----------------------------------------------------------------------
// fixed-operand VFP patch set
// ----------------------------------------------------------------------

/// `ee07 xxxx` - move a core register into s14/s15.
pub(crate) fn vmov_from(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str("vmov");
    state.pad_mnemonic();
    state.text.push_str(match instr & 0xffff {
        0x0a10 => "s14, r0",
        0x1a90 => "s15, r1",
        0x1a10 => "s14, r1",
        0x0a90 => "s15, r0",
        _ => return false,
    });
    state.size = 4;
    true
}

/// `ee17 xxxx` - move s15 back into r0.
pub(crate) fn vmov_to(state: &mut Disassembler, instr: u32) -> bool {
    if instr & 0xffff != 0x0a90 {
        return false;
    }
    state.text.push_str("vmov");
    state.pad_mnemonic();
    state.text.push_str("r0, s15");
    state.size = 4;
    true
}

/// `eef1 xxxx` - copy the floating-point flags into APSR.
pub(crate) fn vmrs(state: &mut Disassembler, _instr: u32) -> bool {
    state.text.push_str("vmrs");
    state.pad_mnemonic();
    state.text.push_str("apsr_nzcv, fpscr");
    state.size = 4;
    true
}

/// `ee77 xxxx` - single-precision add/subtract on the fixed registers.
pub(crate) fn float_addsub(state: &mut Disassembler, instr: u32) -> bool {
    state.text.push_str(match instr & 0xffff {
        0x7a27 => "vadd.f32",
        0x7a67 => "vsub.f32",
        _ => return false,
    });
    state.pad_mnemonic();
    state.text.push_str("s15, s14, s15");
    state.size = 4;
    true
}

/// `ee67 xxxx` - single-precision multiply.
pub(crate) fn float_mul(state: &mut Disassembler, _instr: u32) -> bool {
    state.text.push_str("vmul.f32");
    state.pad_mnemonic();
    state.text.push_str("s15, s14, s15");
    state.size = 4;
    true
}

/// `eec7 xxxx` - single-precision divide.
pub(crate) fn float_div(state: &mut Disassembler, _instr: u32) -> bool {
    state.text.push_str("vdiv.f32");
    state.pad_mnemonic();
    state.text.push_str("s15, s14, s15");
    state.size = 4;
    true
}

/// `eeb4 xxxx` - single-precision compare.
pub(crate) fn float_cmp(state: &mut Disassembler, _instr: u32) -> bool {
    state.text.push_str("vcmpe.f32");
    state.pad_mnemonic();
    state.text.push_str("s14, s15");
    state.size = 4;
    true
}

/// `eef8 xxxx` - integer to single-precision conversion.
pub(crate) fn int_to_float(state: &mut Disassembler, _instr: u32) -> bool {
    state.text.push_str("vcvt.f32");
    state.pad_mnemonic();
    state.text.push_str("s15, s15");
    state.size = 4;
    true
}

/// `eefd xxxx` - single-precision to integer conversion.
pub(crate) fn float_to_int(state: &mut Disassembler, _instr: u32) -> bool {
    state.text.push_str("vcvt.s32");
    state.pad_mnemonic();
    state.text.push_str("s15, s15");
    state.size = 4;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disasm::{Disassembler, Options};
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
    fn decode_modified_immediate_mov() {
        // mov r0, #-1 (0xffffffff is the replicate-all-bytes pattern)
        assert_eq!(
            decode_commented(0xf04f, 0x30ff),
            "mov     r0, #-1         ; 0xffffffff"
        );
        // mov r1, #0x12
        assert_eq!(decode_commented(0xf04f, 0x0112), "mov     r1, #18         ; 0x12");
        // movs r0, #1
        assert_eq!(decode(0xf05f, 0x0001), "movs    r0, #1");
    }

    #[test]
    fn decode_modified_immediate_aliases() {
        // tst r0, #255: ands with rd = pc and the s bit set
        assert_eq!(decode(0xf010, 0x0fff), "tst     r0, #255");
        // cmp r2, #0x11000000
        assert_eq!(decode(0xf1b2, 0x5f88), "cmp     r2, #285212672");
        // and r1, r0, #15
        assert_eq!(decode(0xf000, 0x010f), "and     r1, r0, #15");
        // mvn r3, #12
        assert_eq!(decode(0xf06f, 0x030c), "mvn     r3, #12");
    }

    #[test]
    fn decode_plain_immediates() {
        // addw r0, r1, #0x234
        assert_eq!(decode(0xf201, 0x2034), "addw    r0, r1, #564");
        // subw r0, r1, #4
        assert_eq!(decode(0xf2a1, 0x0004), "subw    r0, r1, #4");
        // adr r0, 0x8000108 (add form)
        assert_eq!(decode(0xf20f, 0x0004), "adr     r0, 8000108");
        // adr r0, 0x8000100 (sub form)
        assert_eq!(decode(0xf2af, 0x0004), "adr     r0, 8000100");
        // movw r3, #0x1234
        assert_eq!(decode(0xf241, 0x2334), "movw    r3, #4660");
        // movt r3, #0x1234
        assert_eq!(decode(0xf2c1, 0x2334), "movt    r3, #4660");
    }

    #[test]
    fn decode_bitfield_and_saturate() {
        // sbfx r0, r1, #4, #8
        assert_eq!(decode(0xf341, 0x1007), "sbfx    r0, r1, #4, #8");
        // ubfx r0, r1, #4, #8
        assert_eq!(decode(0xf3c1, 0x1007), "ubfx    r0, r1, #4, #8");
        // bfi r0, r1, #4, #8
        assert_eq!(decode(0xf361, 0x100b), "bfi     r0, r1, #4, #8");
        // bfc r0, #4, #8
        assert_eq!(decode(0xf36f, 0x100b), "bfc     r0, #4, #8");
        // ssat r0, #8, r1
        assert_eq!(decode(0xf301, 0x0007), "ssat    r0, #8, r1");
        // usat16 r0, #8, r1
        assert_eq!(decode(0xf3a1, 0x0008), "usat16  r0, #9, r1");
    }

    #[test]
    fn decode_long_branches() {
        let mut disasm = Disassembler::new(Options::default());
        disasm.set_address(0x0800_0100);
        assert!(disasm.step_thumb(0xf000, 0xf802));
        assert_eq!(disasm.text(), "bl      8000108");
        assert_eq!(disasm.address_type(0x0800_0108), PoolKind::Code);

        // backwards: bl 0x080000f0
        assert_eq!(decode(0xf7ff, 0xfff6), "bl      80000f0");
        // b.w forward
        assert_eq!(decode(0xf000, 0xb802), "b       8000108");
        // blx aligns its target
        let mut disasm = Disassembler::new(Options::default());
        disasm.set_address(0x0800_0102);
        assert!(disasm.step_thumb(0xf000, 0xe802));
        assert_eq!(disasm.text(), "blx     8000108");
        // conditional: beq.w
        assert_eq!(decode(0xf000, 0x8002), "beq     8000108");
        assert_eq!(decode(0xf43f, 0xaffe), "beq     8000100");
    }

    #[test]
    fn decode_msr_mrs() {
        // msr PRIMASK, r0
        assert_eq!(decode(0xf380, 0x8810), "msr     PRIMASK, r0");
        // msr APSR_nzcvq, r1
        assert_eq!(decode(0xf381, 0x8800), "msr     APSR_nzcvq, r1");
        // mrs r0, MSP: no mask suffix on the read side
        assert_eq!(decode(0xf3ef, 0x8008), "mrs     r0, MSP");
        // mrs r3, CONTROL
        assert_eq!(decode(0xf3ef, 0x8314), "mrs     r3, CONTROL");
    }

    #[test]
    fn decode_hints_and_barriers() {
        assert_eq!(decode(0xf3af, 0x8000), "nop");
        assert_eq!(decode(0xf3af, 0x8004), "sev");
        assert_eq!(decode(0xf3af, 0x80f0), "dbg     #0");
        assert_eq!(decode(0xf3bf, 0x8f4f), "dsb");
        assert_eq!(decode(0xf3bf, 0x8f5f), "dmb");
        assert_eq!(decode(0xf3bf, 0x8f6f), "isb");
        assert_eq!(decode(0xf3bf, 0x8f2f), "clrex");
        // reserved barrier encodings are data
        assert_eq!(decode(0xf3bf, 0x8f0f), ".word   0xf3bf8f0f");
    }

    #[test]
    fn decode_const_shift() {
        // mov.w r0, r1
        assert_eq!(decode(0xea4f, 0x0001), "mov     r0, r1");
        // lsl r0, r1, #4
        assert_eq!(decode(0xea4f, 0x1001), "lsl     r0, r1, #4");
        // rrx r0, r1
        assert_eq!(decode(0xea4f, 0x0031), "rrx     r0, r1");
        // and.w r0, r1, r2, lsr #6
        assert_eq!(decode(0xea01, 0x1092), "and     r0, r1, r2, lsr #6");
        // tst r1, r2
        assert_eq!(decode(0xea11, 0x0f02), "tst     r1, r2");
        // orn r0, r1, r2
        assert_eq!(decode(0xea61, 0x0002), "orn     r0, r1, r2");
        // pkhtb r0, r1, r2, asr #32
        assert_eq!(decode(0xeac1, 0x0022), "pkhtb   r0, r1, r2, asr #32");
        // adds.w r0, r1, r2
        assert_eq!(decode(0xeb11, 0x0002), "adds    r0, r1, r2");
    }

    #[test]
    fn decode_register_shift_and_extend() {
        // lsl r0, r1, r2
        assert_eq!(decode(0xfa01, 0xf002), "lsl     r0, r1, r2");
        // lsrs r0, r1, r2
        assert_eq!(decode(0xfa31, 0xf002), "lsrs    r0, r1, r2");
        // sxth r0, r1
        assert_eq!(decode(0xfa0f, 0xf081), "sxth    r0, r1");
        // uxtb r0, r1, ror #8
        assert_eq!(decode(0xfa5f, 0xf091), "uxtb    r0, r1, ror #8");
        // sxtah r0, r1, r2
        assert_eq!(decode(0xfa01, 0xf082), "sxtah   r0, r1, r2");
    }

    #[test]
    fn decode_simd_and_misc() {
        // sadd8 r0, r1, r2
        assert_eq!(decode(0xfa81, 0xf002), "sadd8   r0, r1, r2");
        // uqsub16 r0, r1, r2
        assert_eq!(decode(0xfad1, 0xf052), "uqsub16 r0, r1, r2");
        // clz r0, r1
        assert_eq!(decode(0xfab1, 0xf081), "clz     r0, r1");
        // rbit r0, r1
        assert_eq!(decode(0xfa91, 0xf0a1), "rbit    r0, r1");
        // rev.w r0, r1
        assert_eq!(decode(0xfa91, 0xf081), "rev     r0, r1");
        // sel r0, r1, r2
        assert_eq!(decode(0xfaa1, 0xf082), "sel     r0, r1, r2");
    }

    #[test]
    fn decode_multiplies() {
        // mul.w r0, r1, r2
        assert_eq!(decode(0xfb01, 0xf002), "mul     r0, r1, r2");
        // mla r0, r1, r2, r3
        assert_eq!(decode(0xfb01, 0x3002), "mla     r0, r1, r2, r3");
        // mls r0, r1, r2, r3
        assert_eq!(decode(0xfb01, 0x3012), "mls     r0, r1, r2, r3");
        // smulbb r0, r1, r2
        assert_eq!(decode(0xfb11, 0xf002), "smulbb  r0, r1, r2");
        // smulwt r0, r1, r2
        assert_eq!(decode(0xfb31, 0xf012), "smulwt  r0, r1, r2");
        // smull r0, r1, r2, r3
        assert_eq!(decode(0xfb82, 0x0103), "smull   r0, r1, r2, r3");
        // umull r0, r1, r2, r3
        assert_eq!(decode(0xfba2, 0x0103), "umull   r0, r1, r2, r3");
        // sdiv r0, r1, r2
        assert_eq!(decode(0xfb91, 0xf0f2), "sdiv    r0, r1, r2");
        // udiv r0, r1, r2
        assert_eq!(decode(0xfbb1, 0xf0f2), "udiv    r0, r1, r2");
        // smlalbb r0, r1, r2, r3
        assert_eq!(decode(0xfbc2, 0x0183), "smlalbb r0, r1, r2, r3");
        // umaal r0, r1, r2, r3
        assert_eq!(decode(0xfbe2, 0x0163), "umaal   r0, r1, r2, r3");
    }

    #[test]
    fn decode_single_loadstor() {
        // ldr.w r0, [r1, #16]
        assert_eq!(decode(0xf8d1, 0x0010), "ldr     r0, [r1, #16]");
        // str.w r0, [r1, #16]
        assert_eq!(decode(0xf8c1, 0x0010), "str     r0, [r1, #16]");
        // ldrb.w r0, [r1, #16]
        assert_eq!(decode(0xf891, 0x0010), "ldrb    r0, [r1, #16]");
        // ldrsh r0, [r1, #16]
        assert_eq!(decode(0xf9b1, 0x0010), "ldrsh   r0, [r1, #16]");
        // ldr r0, [r1, #-4]
        assert_eq!(decode(0xf851, 0x0c04), "ldr     r0, [r1, #-4]");
        // ldr r0, [r1], #4
        assert_eq!(decode(0xf851, 0x0b04), "ldr     r0, [r1], #4");
        // ldr r0, [r1, #4]!
        assert_eq!(decode(0xf851, 0x0f04), "ldr     r0, [r1, #4]!");
        // ldr r0, [r1, r2, lsl #2]
        assert_eq!(decode(0xf851, 0x0022), "ldr     r0, [r1, r2, lsl #2]");
        // ldrt r0, [r1, #4]
        assert_eq!(decode(0xf851, 0x0e04), "ldrt    r0, [r1, #4]");
        // pld [r1, #16]
        assert_eq!(decode(0xf891, 0xf010), "pld     [r1, #16]");
    }

    #[test]
    fn wide_literal_load_marks_pool() {
        let mut disasm = Disassembler::new(Options::default());
        disasm.set_address(0x0800_0100);
        // ldr.w r0, [pc, #8]
        assert!(disasm.step_thumb(0xf8df, 0x0008));
        assert_eq!(disasm.text(), "ldr     r0, [pc, #8]");
        assert_eq!(disasm.ldr_target(), Some(0x0800_010c));
        assert_eq!(disasm.address_type(0x0800_010c), PoolKind::Literal);

        // ldr.w r0, [pc, #-8]
        let mut disasm = Disassembler::new(Options::default());
        disasm.set_address(0x0800_0100);
        assert!(disasm.step_thumb(0xf85f, 0x0008));
        assert_eq!(disasm.text(), "ldr     r0, [pc, #-8]");
        assert_eq!(disasm.ldr_target(), Some(0x0800_00fc));
    }

    #[test]
    fn decode_dual_and_exclusive() {
        // strd r0, r1, [r2, #8]
        assert_eq!(decode(0xe9c2, 0x0102), "strd    r0, r1, [r2, #8]");
        // ldrd r0, r1, [r2, #-8]!
        assert_eq!(decode(0xe972, 0x0102), "ldrd    r0, r1, [r2, #-8]!");
        // ldrd r0, r1, [r2], #8
        assert_eq!(decode(0xe8f2, 0x0102), "ldrd    r0, r1, [r2], #8");
        // ldrex r0, [r1]
        assert_eq!(decode(0xe851, 0x0f00), "ldrex   r0, [r1]");
        // ldrex r0, [r1, #4]
        assert_eq!(decode(0xe851, 0x0f01), "ldrex   r0, [r1, #4]");
        // strex r0, r1, [r2]
        assert_eq!(decode(0xe842, 0x1000), "strex   r0, r1, [r2]");
        // ldrexb r1, [r2]
        assert_eq!(decode(0xe8d2, 0x1f4f), "ldrexb  r1, [r2]");
        // strexh r0, r1, [r2]
        assert_eq!(decode(0xe8c2, 0x1f50), "strexh  r0, r1, [r2]");
        // tbb [r1, r2]
        assert_eq!(decode(0xe8d1, 0xf002), "tbb     [r1, r2]");
        // tbh [r1, r2, lsl #1]
        assert_eq!(decode(0xe8d1, 0xf012), "tbh     [r1, r2, lsl #1]");
    }

    #[test]
    fn decode_wide_multiple_and_aliases() {
        // push.w {r4-r6, lr}
        assert_eq!(decode(0xe92d, 0x4070), "push    {r4-r6, lr}");
        // pop.w {r4-r6, pc}
        assert_eq!(decode(0xe8bd, 0x8070), "pop     {r4-r6, pc}");
        // stmia r1!, {r2, r3}
        assert_eq!(decode(0xe8a1, 0x000c), "stmia   r1!, {r2, r3}");
        // ldmdb r1, {r2, r3}: wrong direction for the pop alias
        assert_eq!(decode(0xe911, 0x000c), "ldmdb   r1, {r2, r3}");
        // ldmdb sp!, {r2, r3} stays ldmdb
        assert_eq!(decode(0xe93d, 0x000c), "ldmdb   sp!, {r2, r3}");
        // srsdb #16
        assert_eq!(decode(0xe80d, 0xc010), "srsdb   #16");
        // rfeia sp!
        assert_eq!(decode(0xe9bd, 0xc000), "rfeia   sp!");
    }

    #[test]
    fn decode_coprocessor() {
        // stc 1, cr0, [r2, #-16]
        assert_eq!(decode(0xed02, 0x0104), "stc     1, cr0, [r2, #-16]");
        // ldc 1, cr0, [r2], #16
        assert_eq!(decode(0xecb2, 0x0104), "ldc     1, cr0, [r2], #16");
        // mcrr 14, 7, r0, r1, cr2
        assert_eq!(decode(0xec41, 0x0e72), "mcrr    14, 7, r0, r1, cr2");
        // cdp 15, 3, cr0, cr1, cr2, {4}
        assert_eq!(decode(0xee31, 0x0f82), "cdp     15, 3, cr0, cr1, cr2, {4}");
        // mcr 15, 0, r0, cr1, cr0, {0}
        assert_eq!(decode(0xee01, 0x0f10), "mcr     15, 0, r0, cr1, cr0, {0}");
        // mrc 15, 0, APSR_nzcv, cr1, cr0, {0}
        assert_eq!(decode(0xee11, 0xff10), "mrc     15, 0, APSR_nzcv, cr1, cr0, {0}");
    }

    #[test]
    fn decode_vfp_patches() {
        assert_eq!(decode(0xee07, 0x0a10), "vmov    s14, r0");
        assert_eq!(decode(0xee07, 0x1a90), "vmov    s15, r1");
        assert_eq!(decode(0xee17, 0x0a90), "vmov    r0, s15");
        assert_eq!(decode(0xeef1, 0xfa10), "vmrs    apsr_nzcv, fpscr");
        assert_eq!(decode(0xee77, 0x7a27), "vadd.f32 s15, s14, s15");
        assert_eq!(decode(0xee77, 0x7a67), "vsub.f32 s15, s14, s15");
        assert_eq!(decode(0xee67, 0x7a27), "vmul.f32 s15, s14, s15");
        assert_eq!(decode(0xeec7, 0x7a27), "vdiv.f32 s15, s14, s15");
        assert_eq!(decode(0xeeb4, 0x7a67), "vcmpe.f32 s14, s15");
        assert_eq!(decode(0xeef8, 0x7ac7), "vcvt.f32 s15, s15");
        assert_eq!(decode(0xeefd, 0x7ae7), "vcvt.s32 s15, s15");
    }

    #[test]
    fn decode_misc_control_ops() {
        // smc #5
        assert_eq!(decode(0xf7f5, 0x8000), "smc     #5");
        // subs pc, lr, #4
        assert_eq!(decode(0xf3de, 0x8f04), "subs    pc, lr, #4");
        // bxj r3
        assert_eq!(decode(0xf3c3, 0x8f00), "bxj     r3");
    }
}
