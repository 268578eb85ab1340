//! # A32 (classic ARM) decoding
//!
//! Dispatch uses bits 27:25 of the word as the first-level index, with
//! secondary discriminators on bits 24-4:
//!
//! ```text
//! ┌──────┬──────────────────────────────────────────────────────────────────┐
//! │ 27:25│                                                                  │
//! ├──────┼──────────────────────────────────────────────────────────────────┤
//! │ 000  │ bit4=0: data processing, immediate shift (+ mrs/msr/bxj/smla)   │
//! │      │ bits7,4=0,1: data processing, register shift (+ bx/clz/bkpt)    │
//! │      │ bits7,4=1,1: multiplies, extra load/stores, swp, ldrex/strex    │
//! │ 001  │ data processing, immediate (incl. the msr immediate form)       │
//! │ 010  │ load/store immediate offset (cond 15 -> pld)                    │
//! │ 011  │ bit4=0: load/store register offset; bit4=1: media instructions  │
//! │ 100  │ load/store multiple (push/pop aliases on sp with writeback)     │
//! │ 101  │ b and bl                                                        │
//! │ 110  │ coprocessor load/store, mcrr/mrrc (cond 15 -> the "2" forms)    │
//! │ 1110 │ bit4=0: cdp/cdp2; bit4=1: mcr/mrc/mcr2/mrc2                     │
//! │ 1111 │ svc                                                             │
//! └──────┴──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Almost every handler starts by rejecting condition 15; the exceptions
//! are the encodings that reuse it as the unconditional-extension space
//! (`pld` and the coprocessor `...2` variants).

use std::fmt::Write as _;

use crate::bitwise::{Bits, align4};
use crate::disasm::Disassembler;
use crate::pool::PoolKind;
use crate::registers::{REG_SP, register_name};
use crate::shift::{ShiftKind, decode_imm_shift};

const DP_MNEMONICS: [&str; 16] = [
    "and", "eor", "sub", "rsb", "add", "adc", "sbc", "rsc", "tst", "teq", "cmp", "cmn", "orr",
    "mov", "bic", "mvn",
];

/// Mnemonic of a data-processing slot. The comparison slots with the S bit
/// clear encode a grab-bag of other instructions; `variant` tells the
/// caller's encoding space apart (1 = immediate shift, 2 = register shift,
/// 4 = immediate) and `opc2` carries bits 7:5. Returns `None` for invalid
/// combinations.
fn opcode_name(opc: u32, variant: u32, opc2: u32) -> Option<String> {
    if !(8..12).contains(&opc) || variant == 0 {
        return Some(DP_MNEMONICS[opc as usize].to_owned());
    }
    let mut field = String::new();
    match variant {
        1 => match opc2 {
            0 => field.push_str(if opc & 1 == 0 { "mrs" } else { "msr" }),
            1 => field.push_str("bxj"),
            _ => {
                // signed halfword multiplies; x and y select the operand
                // halves from bits 5 and 6
                let x = if opc2 & 1 != 0 { 't' } else { 'b' };
                let y = if opc2 & 2 != 0 { 't' } else { 'b' };
                match opc & 3 {
                    0 => field.push_str("smla"),
                    1 => field.push_str(if opc2 & 1 == 0 { "smlaw" } else { "smulw" }),
                    2 => field.push_str("smlal"),
                    _ => field.push_str("smul"),
                }
                if opc & 3 != 1 {
                    field.push(x);
                }
                field.push(y);
            }
        },
        2 => match opc2 {
            0 => {
                if opc & 0x03 == 1 {
                    field.push_str("bx");
                } else if opc & 0x03 == 3 {
                    field.push_str("clz");
                }
            }
            1 => {
                if opc & 0x03 == 1 {
                    field.push_str("blx");
                }
            }
            2 => field.push_str(match opc & 0x03 {
                0 => "qadd",
                1 => "qsub",
                2 => "qdadd",
                _ => "qdsub",
            }),
            3 => field.push_str("bkpt"),
            _ => {}
        },
        _ => field.push_str("msr"),
    }
    if field.is_empty() { None } else { Some(field) }
}

/// Operand shape of a data-processing opcode: the comparisons take
/// `Rn, shifter`, the moves `Rd, shifter`, everything else all three.
fn opcode_form(opc: u32) -> u32 {
    if (8..12).contains(&opc) {
        1
    } else if opc == 13 || opc == 15 {
        2
    } else {
        3
    }
}

/// `xxxx 000x ...` with bit 4 clear - data processing, immediate shift.
fn dataproc_imsh(state: &mut Disassembler, instr: u32) -> bool {
    let cond = instr.get_bits(28..=31);
    if cond == 15 {
        return false;
    }

    let shifttype = instr.get_bits(5..=6);
    let shiftcount = instr.get_bits(7..=11);
    let opc = instr.get_bits(21..=24);
    let setflags = instr.is_bit_on(20);
    if opc == 13 && (shifttype != 0 || shiftcount != 0) {
        // the preferred syntax spells a shifted mov as the shift itself
        _ = write!(state.text, "{}", ShiftKind::from(shifttype));
    } else {
        let variant = u32::from(!setflags);
        match opcode_name(opc, variant, instr.get_bits(5..=7)) {
            Some(name) => state.text.push_str(&name),
            None => return false,
        }
    }
    state.add_condition(cond);
    if setflags && !(8..12).contains(&opc) {
        state.text.push('s');
    }
    state.pad_mnemonic();

    if (8..12).contains(&opc) && !setflags {
        // mrs, msr, bxj and the signed multiplies
        let opc2 = instr.get_bits(5..=7);
        match opc2 {
            0 => {
                let status = if instr.is_bit_off(22) { "CPSR" } else { "SPSR" };
                if instr.is_bit_off(21) {
                    _ = write!(state.text, "{}, {status}", register_name(instr.get_bits(12..=15)));
                } else {
                    _ = write!(state.text, "{status}, {}", register_name(instr.get_bits(0..=3)));
                }
            }
            1 => state.text.push_str(register_name(instr.get_bits(0..=3))),
            _ => match opc & 3 {
                0 | 1 => {
                    _ = write!(
                        state.text,
                        "{}, {}, {}, {}",
                        register_name(instr.get_bits(16..=19)),
                        register_name(instr.get_bits(0..=3)),
                        register_name(instr.get_bits(8..=11)),
                        register_name(instr.get_bits(12..=15))
                    );
                }
                2 => {
                    _ = write!(
                        state.text,
                        "{}, {}, {}, {}",
                        register_name(instr.get_bits(12..=15)),
                        register_name(instr.get_bits(16..=19)),
                        register_name(instr.get_bits(0..=3)),
                        register_name(instr.get_bits(8..=11))
                    );
                }
                _ => {
                    _ = write!(
                        state.text,
                        "{}, {}, {}",
                        register_name(instr.get_bits(16..=19)),
                        register_name(instr.get_bits(0..=3)),
                        register_name(instr.get_bits(8..=11))
                    );
                }
            },
        }
    } else {
        match opcode_form(opc) {
            1 => {
                _ = write!(
                    state.text,
                    "{}, {}",
                    register_name(instr.get_bits(16..=19)),
                    register_name(instr.get_bits(0..=3))
                );
            }
            2 => {
                _ = write!(
                    state.text,
                    "{}, {}",
                    register_name(instr.get_bits(12..=15)),
                    register_name(instr.get_bits(0..=3))
                );
            }
            _ => {
                _ = write!(
                    state.text,
                    "{}, {}, {}",
                    register_name(instr.get_bits(12..=15)),
                    register_name(instr.get_bits(16..=19)),
                    register_name(instr.get_bits(0..=3))
                );
            }
        }
        if shifttype != 0 || shiftcount != 0 {
            if opc == 13 {
                _ = write!(state.text, ", #{shiftcount}");
            } else {
                _ = write!(state.text, ", {}", decode_imm_shift(shifttype, shiftcount));
            }
        }
    }

    true
}

/// `xxxx 000x ...` with bits 7,4 = 0,1 - data processing, register shift.
fn dataproc_rxsh(state: &mut Disassembler, instr: u32) -> bool {
    let cond = instr.get_bits(28..=31);
    if cond == 15 {
        return false;
    }

    let opc = instr.get_bits(21..=24);
    let setflags = instr.is_bit_on(20);
    let variant = 2 * u32::from(!setflags);
    match opcode_name(opc, variant, instr.get_bits(5..=7)) {
        Some(name) => state.text.push_str(&name),
        None => return false,
    }
    state.add_condition(cond);
    if setflags && !(8..12).contains(&opc) {
        state.text.push('s');
    }
    state.pad_mnemonic();

    if (8..12).contains(&opc) && !setflags {
        let opc2 = instr.get_bits(5..=7);
        if opc & 0x03 == 1 && opc2 < 2 {
            // bx and blx
            state.text.push_str(register_name(instr.get_bits(0..=3)));
        } else if opc & 0x03 == 3 && opc2 == 0 {
            // clz
            _ = write!(
                state.text,
                "{}, {}",
                register_name(instr.get_bits(12..=15)),
                register_name(instr.get_bits(0..=3))
            );
        } else if opc2 == 2 {
            _ = write!(
                state.text,
                "{}, {}, {}",
                register_name(instr.get_bits(12..=15)),
                register_name(instr.get_bits(16..=19)),
                register_name(instr.get_bits(0..=3))
            );
        } else if opc2 == 3 {
            let imm = instr.get_bits(0..=3) + (instr.get_bits(8..=19) << 4);
            _ = write!(state.text, "#{imm}");
            state.append_comment_hex(imm);
        }
    } else {
        match opcode_form(opc) {
            1 => {
                _ = write!(
                    state.text,
                    "{}, {}",
                    register_name(instr.get_bits(16..=19)),
                    register_name(instr.get_bits(0..=3))
                );
            }
            2 => {
                _ = write!(
                    state.text,
                    "{}, {}",
                    register_name(instr.get_bits(12..=15)),
                    register_name(instr.get_bits(0..=3))
                );
            }
            _ => {
                _ = write!(
                    state.text,
                    "{}, {}, {}",
                    register_name(instr.get_bits(12..=15)),
                    register_name(instr.get_bits(16..=19)),
                    register_name(instr.get_bits(0..=3))
                );
            }
        }
        _ = write!(
            state.text,
            ", {} {}",
            ShiftKind::from(instr.get_bits(5..=6)),
            register_name(instr.get_bits(8..=11))
        );
    }

    true
}

/// `xxxx 000x ...` with bits 7,4 = 1,1 - multiplies and extra load/stores.
fn mult_loadstor(state: &mut Disassembler, instr: u32) -> bool {
    let cond = instr.get_bits(28..=31);
    if cond == 15 {
        return false;
    }

    let opc2 = instr.get_bits(4..=7);
    if instr.is_bit_off(24) && opc2 == 9 {
        // multiplies
        let opc = instr.get_bits(21..=23);
        state.text.push_str(match opc {
            0 => "mul",
            1 => "mla",
            4 => "umull",
            5 => "umlal",
            6 => "smull",
            7 => "smlal",
            _ => return false,
        });
        state.add_condition(cond);
        if instr.is_bit_on(20) {
            state.text.push('s');
        }
        state.pad_mnemonic();
        if opc >= 4 {
            _ = write!(
                state.text,
                "{}, {}, {}, {}",
                register_name(instr.get_bits(12..=15)),
                register_name(instr.get_bits(16..=19)),
                register_name(instr.get_bits(0..=3)),
                register_name(instr.get_bits(8..=11))
            );
        } else if instr.is_bit_on(21) {
            _ = write!(
                state.text,
                "{}, {}, {}, {}",
                register_name(instr.get_bits(16..=19)),
                register_name(instr.get_bits(0..=3)),
                register_name(instr.get_bits(8..=11)),
                register_name(instr.get_bits(12..=15))
            );
        } else {
            _ = write!(
                state.text,
                "{}, {}, {}",
                register_name(instr.get_bits(16..=19)),
                register_name(instr.get_bits(0..=3)),
                register_name(instr.get_bits(8..=11))
            );
        }
    } else {
        // 1 = halfword/doubleword, 2 = exclusive, 3 = swap
        let mut format = 1;
        match opc2 {
            9 => {
                if instr.is_bit_off(23) {
                    state.text.push_str(if instr.is_bit_on(22) { "swpb" } else { "swp" });
                    format = 3;
                } else {
                    state.text.push_str(if instr.is_bit_on(20) { "ldrex" } else { "strex" });
                    format = 2;
                }
            }
            11 => state.text.push_str(if instr.is_bit_on(20) { "ldrh" } else { "strh" }),
            13 | 15 => {
                if instr.is_bit_on(20) {
                    state.text.push_str(if instr.is_bit_on(5) { "ldrsh" } else { "ldrsb" });
                } else {
                    state.text.push_str(if instr.is_bit_off(5) { "ldrd" } else { "strd" });
                }
            }
            _ => return false,
        }
        state.add_condition(cond);
        state.pad_mnemonic();

        match format {
            1 => {
                if instr.is_bit_on(22) {
                    let imm = instr.get_bits(0..=3) + (instr.get_bits(8..=11) << 4);
                    if instr.is_bit_on(24) {
                        _ = write!(
                            state.text,
                            "{}, [{}, #{imm}]",
                            register_name(instr.get_bits(12..=15)),
                            register_name(instr.get_bits(16..=19))
                        );
                    } else {
                        _ = write!(
                            state.text,
                            "{}, [{}], #{imm}",
                            register_name(instr.get_bits(12..=15)),
                            register_name(instr.get_bits(16..=19))
                        );
                    }
                } else if instr.is_bit_on(24) {
                    _ = write!(
                        state.text,
                        "{}, [{}, {}]",
                        register_name(instr.get_bits(12..=15)),
                        register_name(instr.get_bits(16..=19)),
                        register_name(instr.get_bits(0..=3))
                    );
                } else {
                    _ = write!(
                        state.text,
                        "{}, [{}], {}",
                        register_name(instr.get_bits(12..=15)),
                        register_name(instr.get_bits(16..=19)),
                        register_name(instr.get_bits(0..=3))
                    );
                }
                if instr.is_bit_on(21) {
                    state.text.push('!');
                }
            }
            2 => {
                if instr.is_bit_on(20) {
                    _ = write!(
                        state.text,
                        "{}, [{}]",
                        register_name(instr.get_bits(12..=15)),
                        register_name(instr.get_bits(16..=19))
                    );
                } else {
                    _ = write!(
                        state.text,
                        "{}, {}, [{}]",
                        register_name(instr.get_bits(12..=15)),
                        register_name(instr.get_bits(0..=3)),
                        register_name(instr.get_bits(16..=19))
                    );
                }
            }
            _ => {
                _ = write!(
                    state.text,
                    "{}, {}, [{}]",
                    register_name(instr.get_bits(12..=15)),
                    register_name(instr.get_bits(0..=3)),
                    register_name(instr.get_bits(16..=19))
                );
            }
        }
    }

    true
}

/// `xxxx 001x ...` - data processing, immediate (and the msr immediate
/// form).
fn dataproc_imm(state: &mut Disassembler, instr: u32) -> bool {
    let cond = instr.get_bits(28..=31);
    if cond == 15 {
        return false;
    }

    let opc = instr.get_bits(21..=24);
    let setflags = instr.is_bit_on(20);
    let variant = 4 * u32::from(!setflags);
    match opcode_name(opc, variant, instr.get_bits(5..=7)) {
        Some(name) => state.text.push_str(&name),
        None => return false,
    }
    state.add_condition(cond);
    if setflags && !(8..12).contains(&opc) {
        state.text.push('s');
    }
    state.pad_mnemonic();

    let mut imm = instr.get_bits(0..=7);
    let rot = instr.get_bits(8..=11);
    if rot != 0 {
        imm = imm.rotate_right(2 * rot);
    }
    if (8..12).contains(&opc) && !setflags {
        state.text.push_str("CPSR_");
        if instr.is_bit_on(16) {
            state.text.push('c');
        }
        if instr.is_bit_on(17) {
            state.text.push('x');
        }
        if instr.is_bit_on(18) {
            state.text.push('s');
        }
        if instr.is_bit_on(19) {
            state.text.push('f');
        }
        _ = write!(state.text, ", #{imm}");
    } else {
        match opcode_form(opc) {
            1 => {
                _ = write!(state.text, "{}, #{imm}", register_name(instr.get_bits(16..=19)));
            }
            2 => {
                _ = write!(state.text, "{}, #{imm}", register_name(instr.get_bits(12..=15)));
            }
            _ => {
                _ = write!(
                    state.text,
                    "{}, {}, #{imm}",
                    register_name(instr.get_bits(12..=15)),
                    register_name(instr.get_bits(16..=19))
                );
            }
        }
    }

    true
}

/// `xxxx 010x ...` - load/store with immediate offset (condition 15 is
/// `pld`).
fn loadstor_imm(state: &mut Disassembler, instr: u32) -> bool {
    let cond = instr.get_bits(28..=31);
    if cond == 15 {
        state.text.push_str("pld");
    } else {
        state.text.push_str(if instr.is_bit_on(20) { "ldr" } else { "str" });
        state.add_condition(cond);
        if instr.is_bit_on(22) {
            state.text.push('b');
        }
        if instr.is_bit_off(24) && instr.is_bit_on(21) {
            state.text.push('t');
        }
    }
    state.pad_mnemonic();

    let mut imm = instr.get_bits(0..=11) as i32;
    if instr.is_bit_off(23) {
        imm = -imm;
    }
    if cond != 15 {
        _ = write!(state.text, "{}, ", register_name(instr.get_bits(12..=15)));
    }
    let rn = instr.get_bits(16..=19);
    if instr.is_bit_on(24) {
        _ = write!(state.text, "[{}, #{imm}]", register_name(rn));
    } else {
        _ = write!(state.text, "[{}], #{imm}", register_name(rn));
    }
    if instr.is_bit_on(21) {
        state.text.push('!');
    }
    if rn == 15 && instr.is_bit_on(24) && instr.is_bit_off(21) {
        // in ARM state the pc reads as the instruction address plus 8
        let target = align4(state.address.wrapping_add(8)).wrapping_add(imm as u32);
        imm = target as i32;
        state.ldr_addr = Some(target);
        state.mark_address_type(target, PoolKind::Literal);
    }
    state.append_comment_hex(imm as u32);
    true
}

/// `xxxx 011x ...` with bit 4 clear - load/store with register offset.
fn loadstor_reg(state: &mut Disassembler, instr: u32) -> bool {
    let cond = instr.get_bits(28..=31);
    if cond == 15 {
        return false;
    }
    state.text.push_str(if instr.is_bit_on(20) { "ldr" } else { "str" });
    state.add_condition(cond);
    if instr.is_bit_on(22) {
        state.text.push('b');
    }
    if instr.is_bit_off(24) && instr.is_bit_on(21) {
        state.text.push('t');
    }
    state.pad_mnemonic();

    let sign = if instr.is_bit_off(23) { "-" } else { "" };
    _ = write!(
        state.text,
        "{}, [{}, {sign}{}",
        register_name(instr.get_bits(12..=15)),
        register_name(instr.get_bits(16..=19)),
        register_name(instr.get_bits(0..=3))
    );
    let shifttype = instr.get_bits(5..=6);
    let shiftcount = instr.get_bits(7..=11);
    if shifttype != 0 || shiftcount != 0 {
        _ = write!(state.text, ", {}", decode_imm_shift(shifttype, shiftcount));
    }
    state.text.push(']');
    true
}

/// `xxxx 011x ...` with bit 4 set - media instructions.
#[allow(clippy::too_many_lines)]
fn media(state: &mut Disassembler, instr: u32) -> bool {
    let cond = instr.get_bits(28..=31);
    if cond == 15 {
        return false;
    }

    let rm = instr.get_bits(0..=3);
    let rd = instr.get_bits(12..=15);

    match instr.get_bits(23..=24) {
        0 => {
            // parallel add/subtract
            let rn = instr.get_bits(16..=19);
            state.text.push_str(match instr.get_bits(20..=22) {
                1 => "s",
                2 => "q",
                3 => "sh",
                5 => "u",
                6 => "uq",
                7 => "uh",
                _ => return false,
            });
            state.text.push_str(match instr.get_bits(5..=7) {
                0 => "add16",
                1 => "addsubx",
                2 => "subaddx",
                3 => "sub16",
                4 => "add8",
                7 => "sub8",
                _ => return false,
            });
            state.add_condition(cond);
            state.pad_mnemonic();
            _ = write!(
                state.text,
                "{}, {}, {}",
                register_name(rd),
                register_name(rn),
                register_name(rm)
            );
        }
        1 => {
            // halfword pack, saturate and friends
            let rn = instr.get_bits(16..=19);
            if instr.get_bits(20..=22) == 0 && instr.is_bit_off(5) {
                // halfword pack
                state.text.push_str(if instr.is_bit_off(6) { "pkhbt" } else { "pkhtb" });
                state.add_condition(cond);
                state.pad_mnemonic();
                _ = write!(
                    state.text,
                    "{}, {}, {}",
                    register_name(rd),
                    register_name(rn),
                    register_name(rm)
                );
                let shift = instr.get_bits(7..=11);
                if instr.is_bit_off(6) {
                    if shift != 0 {
                        _ = write!(state.text, ", lsl #{shift}");
                    }
                } else {
                    let shift = if shift == 0 { 32 } else { shift };
                    _ = write!(state.text, ", asr #{shift}");
                }
            } else if instr.is_bit_off(5) {
                // word saturate
                state.text.push_str(if instr.is_bit_off(22) { "ssat" } else { "usat" });
                state.add_condition(cond);
                state.pad_mnemonic();
                _ = write!(
                    state.text,
                    "{}, #{}, {}",
                    register_name(rd),
                    instr.get_bits(16..=20),
                    register_name(rm)
                );
                let mut shift = instr.get_bits(7..=11);
                if shift == 0 && instr.is_bit_on(6) {
                    shift = 32;
                }
                if shift != 0 {
                    if instr.is_bit_on(6) {
                        _ = write!(state.text, ", asr #{shift}");
                    } else {
                        _ = write!(state.text, ", lsl #{shift}");
                    }
                }
            } else if instr.get_bits(20..=21) == 2 && instr.get_bits(4..=7) == 0x03 {
                // parallel halfword saturate
                state.text.push_str(if instr.is_bit_off(22) { "ssat16" } else { "usat16" });
                state.add_condition(cond);
                state.pad_mnemonic();
                _ = write!(
                    state.text,
                    "{}, #{}, {}",
                    register_name(rd),
                    instr.get_bits(16..=19),
                    register_name(rm)
                );
            } else if instr.get_bits(20..=21) == 0x03 && instr.get_bits(4..=6) == 0x03 {
                // byte reverse: word, packed halfword, signed halfword
                state.text.push_str("rev");
                if instr.is_bit_on(7) {
                    state.text.push_str(if instr.is_bit_off(22) { "16" } else { "sh" });
                }
                state.add_condition(cond);
                state.pad_mnemonic();
                _ = write!(state.text, "{}, {}", register_name(rd), register_name(rm));
            } else if instr.get_bits(20..=22) == 0 && instr.get_bits(4..=7) == 0x0b {
                // select bytes
                state.text.push_str("sel");
                state.add_condition(cond);
                state.pad_mnemonic();
                _ = write!(
                    state.text,
                    "{}, {}, {}",
                    register_name(rd),
                    register_name(rn),
                    register_name(rm)
                );
            } else if instr.get_bits(4..=7) == 0x07 {
                // sign/zero extend, with optional addition
                state.text.push_str(if instr.is_bit_off(22) { "s" } else { "u" });
                state.text.push_str(match instr.get_bits(20..=21) {
                    0 => {
                        if rn == 15 {
                            "xtb16"
                        } else {
                            "xtab16"
                        }
                    }
                    2 => {
                        if rn == 15 {
                            "xtb"
                        } else {
                            "xtab"
                        }
                    }
                    3 => {
                        if rn == 15 {
                            "xth"
                        } else {
                            "xtah"
                        }
                    }
                    _ => return false,
                });
                state.add_condition(cond);
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
                let rot = instr.get_bits(10..=11);
                if rot != 0 {
                    _ = write!(state.text, ", ror #{}", 8 * rot);
                }
            } else {
                return false;
            }
        }
        2 => {
            // dual halfword multiplies; the accumulator slot reads all-ones
            // for the plain (non-accumulating) forms
            let rd = instr.get_bits(16..=19);
            let ra = instr.get_bits(12..=15);
            let rn = instr.get_bits(0..=3);
            let rm = instr.get_bits(8..=11);
            let opc1 = instr.get_bits(20..=22);
            let opc2 = instr.get_bits(6..=7);
            if opc1 == 0 {
                if ra == 15 {
                    state.text.push_str(if opc2 == 0 { "smuad" } else { "smusd" });
                } else {
                    state.text.push_str(if opc2 == 0 { "smlad" } else { "smlsd" });
                }
            } else if opc1 == 4 {
                state.text.push_str(if opc2 == 0 { "smlald" } else { "smlsld" });
            } else {
                return false;
            }
            if instr.is_bit_on(5) {
                state.text.push('x');
            }
            state.add_condition(cond);
            state.pad_mnemonic();
            if opc1 == 4 {
                _ = write!(
                    state.text,
                    "{}, {}, {}, {}",
                    register_name(ra),
                    register_name(rd),
                    register_name(rn),
                    register_name(rm)
                );
            } else if ra == 15 {
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
        }
        _ => {
            // unsigned sum of absolute differences, with accumulate
            let rd = instr.get_bits(16..=19);
            let rn = instr.get_bits(12..=15);
            let rs = instr.get_bits(8..=11);
            state.text.push_str(if rn == 15 { "usad8" } else { "usada8" });
            state.add_condition(cond);
            state.pad_mnemonic();
            if rn == 15 {
                _ = write!(
                    state.text,
                    "{}, {}, {}",
                    register_name(rd),
                    register_name(rm),
                    register_name(rs)
                );
            } else {
                _ = write!(
                    state.text,
                    "{}, {}, {}, {}",
                    register_name(rd),
                    register_name(rm),
                    register_name(rs),
                    register_name(rn)
                );
            }
        }
    }

    true
}

/// `xxxx 100x ...` - load/store multiple (push/pop aliases on sp with
/// writeback).
fn loadstor_mult(state: &mut Disassembler, instr: u32) -> bool {
    let cond = instr.get_bits(28..=31);
    if cond == 15 {
        return false;
    }

    let rn = instr.get_bits(16..=19);
    let mut alt_syntax = rn == REG_SP && instr.is_bit_on(21);
    let mode = instr.get_bits(23..=24);
    if instr.is_bit_on(20) {
        if mode != 1 {
            alt_syntax = false;
        }
        state.text.push_str(if alt_syntax { "pop" } else { "ldm" });
    } else {
        if mode != 2 {
            alt_syntax = false;
        }
        state.text.push_str(if alt_syntax { "push" } else { "stm" });
    }
    state.add_condition(cond);
    if !alt_syntax {
        const MODES: [&str; 4] = ["da", "ia", "db", "ib"];
        state.text.push_str(MODES[mode as usize]);
    }
    state.pad_mnemonic();

    if !alt_syntax {
        state.text.push_str(register_name(rn));
        if instr.is_bit_on(21) {
            state.text.push('!');
        }
        state.text.push_str(", ");
    }
    state.add_reglist(instr.get_bits(0..=15));
    if instr.is_bit_on(22) {
        state.text.push('^');
    }

    true
}

/// `xxxx 101x ...` - branch and branch with link.
fn branch(state: &mut Disassembler, instr: u32) -> bool {
    let cond = instr.get_bits(28..=31);
    if cond == 15 {
        return false;
    }
    state.text.push('b');
    if instr.is_bit_on(24) {
        state.text.push('l');
    }
    state.add_condition(cond);
    state.pad_mnemonic();
    let offset = instr.get_bits(0..=23).sign_extended(24) as i32;
    let target = state.address.wrapping_add(8).wrapping_add((4 * offset) as u32);
    _ = write!(state.text, "{target:07x}");
    state.append_comment_symbol(target);
    state.mark_address_type(target, PoolKind::Code);
    true
}

/// `xxxx 110x ...` - coprocessor load/store and double register transfers.
fn co_loadstor(state: &mut Disassembler, instr: u32) -> bool {
    let cond = instr.get_bits(28..=31);
    let prefix = instr.get_bits(20..=27);
    if prefix == 0xc4 {
        state.text.push_str("mcrr");
    } else if prefix == 0xc5 {
        state.text.push_str("mrrc");
    } else {
        state.text.push_str(if instr.is_bit_on(20) { "ldc" } else { "stc" });
    }
    if cond == 15 {
        state.text.push('2');
    } else {
        state.add_condition(cond);
    }
    state.pad_mnemonic();
    if prefix == 0xc4 || prefix == 0xc5 {
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
        } else if instr.is_bit_off(21) {
            _ = write!(
                state.text,
                "{}, cr{}, [{rn}], {{{}}}",
                instr.get_bits(8..=11),
                instr.get_bits(12..=15),
                instr.get_bits(0..=7)
            );
        } else {
            _ = write!(
                state.text,
                "{}, cr{}, [{rn}], #{imm}",
                instr.get_bits(8..=11),
                instr.get_bits(12..=15)
            );
        }
    }

    true
}

/// `xxxx 1110 ...` with bit 4 clear - coprocessor data processing.
fn co_dataproc(state: &mut Disassembler, instr: u32) -> bool {
    let cond = instr.get_bits(28..=31);
    state.text.push_str("cdp");
    if cond == 15 {
        state.text.push('2');
    } else {
        state.add_condition(cond);
    }
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
    true
}

/// `xxxx 1110 ...` with bit 4 set - coprocessor register transfers.
fn co_transfer(state: &mut Disassembler, instr: u32) -> bool {
    let cond = instr.get_bits(28..=31);
    state.text.push_str(if instr.is_bit_off(20) { "mcr" } else { "mrc" });
    if cond == 15 {
        state.text.push('2');
    } else {
        state.add_condition(cond);
    }
    state.pad_mnemonic();
    _ = write!(
        state.text,
        "{}, {}, {}, cr{}, cr{}, {{{}}}",
        instr.get_bits(8..=11),
        instr.get_bits(21..=23),
        register_name(instr.get_bits(12..=15)),
        instr.get_bits(16..=19),
        instr.get_bits(0..=3),
        instr.get_bits(5..=7)
    );
    true
}

/// `xxxx 1111 ...` - supervisor (software interrupt) call.
fn soft_interrupt(state: &mut Disassembler, instr: u32) -> bool {
    let cond = instr.get_bits(28..=31);
    if cond == 15 {
        return false;
    }
    state.text.push_str("svc");
    state.add_condition(cond);
    state.pad_mnemonic();
    _ = write!(state.text, "0x{:08x}", instr.get_bits(0..=23));
    true
}

/// Dispatches an A32 word to its handler. Returns false (and leaves the
/// session text for the driver to overwrite) when the word matches no
/// encoding.
pub(crate) fn decode(state: &mut Disassembler, instr: u32) -> bool {
    match instr.get_bits(25..=27) {
        0b000 => {
            if instr.is_bit_off(4) {
                dataproc_imsh(state, instr)
            } else if instr.is_bit_on(7) {
                mult_loadstor(state, instr)
            } else {
                dataproc_rxsh(state, instr)
            }
        }
        0b001 => dataproc_imm(state, instr),
        0b010 => loadstor_imm(state, instr),
        0b011 => {
            if instr.is_bit_off(4) {
                loadstor_reg(state, instr)
            } else {
                media(state, instr)
            }
        }
        0b100 => loadstor_mult(state, instr),
        0b101 => branch(state, instr),
        0b110 => co_loadstor(state, instr),
        _ => {
            if instr.is_bit_off(24) {
                if instr.is_bit_off(4) {
                    co_dataproc(state, instr)
                } else {
                    co_transfer(state, instr)
                }
            } else {
                soft_interrupt(state, instr)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disasm::{Disassembler, Options};
    use crate::symbols::SymbolMode;
    use pretty_assertions::assert_eq;

    fn decode_word(word: u32) -> String {
        let mut disasm = Disassembler::new(Options::default());
        disasm.set_address(0x0800_0000);
        disasm.step_arm(word);
        disasm.text().to_owned()
    }

    #[test]
    fn decode_dataproc_register() {
        assert_eq!(decode_word(0xe080_1002), "add     r1, r0, r2");
        assert_eq!(decode_word(0xe090_1002), "adds    r1, r0, r2");
        assert_eq!(decode_word(0x0080_1002), "addeq   r1, r0, r2");
        assert_eq!(decode_word(0xe1a0_0001), "mov     r0, r1");
        assert_eq!(decode_word(0xe111_0002), "tst     r1, r2");
        assert_eq!(decode_word(0xe151_0002), "cmp     r1, r2");
    }

    #[test]
    fn shifted_mov_prints_as_the_shift() {
        assert_eq!(decode_word(0xe1a0_0101), "lsl     r0, r1, #2");
        assert_eq!(decode_word(0xe1a0_0121), "lsr     r0, r1, #2");
        assert_eq!(decode_word(0xe1a0_0141), "asr     r0, r1, #2");
    }

    #[test]
    fn decode_dataproc_register_shift() {
        assert_eq!(decode_word(0xe080_0211), "add     r0, r0, r1, lsl r2");
        assert_eq!(decode_word(0xe1b0_0071), "movs    r0, r1, ror r0");
    }

    #[test]
    fn decode_dataproc_immediate() {
        assert_eq!(decode_word(0xe351_0005), "cmp     r1, #5");
        assert_eq!(decode_word(0xe3a0_0020), "mov     r0, #32");
        // rotated immediate: 1 ror 2 = 0x40000000
        assert_eq!(decode_word(0xe3a0_0101), "mov     r0, #1073741824");
        assert_eq!(decode_word(0xe280_1001), "add     r1, r0, #1");
    }

    #[test]
    fn decode_psr_transfers() {
        assert_eq!(decode_word(0xe10f_0000), "mrs     r0, CPSR");
        assert_eq!(decode_word(0xe14f_0000), "mrs     r0, SPSR");
        assert_eq!(decode_word(0xe121_f000), "msr     CPSR, r0");
        assert_eq!(decode_word(0xe328_f0f0), "msr     CPSR_f, #240");
    }

    #[test]
    fn decode_branch_exchange_and_misc() {
        assert_eq!(decode_word(0xe12f_ff1e), "bx      lr");
        assert_eq!(decode_word(0xe12f_ff33), "blx     r3");
        assert_eq!(decode_word(0xe16f_0f11), "clz     r0, r1");
        assert_eq!(decode_word(0xe103_1052), "qadd    r1, r3, r2");
        assert_eq!(decode_word(0xe120_0174), "bkpt    #20");
    }

    #[test]
    fn decode_halfword_multiplies() {
        assert_eq!(decode_word(0xe100_32c1), "smlabt  r0, r1, r2, r3");
        assert_eq!(decode_word(0xe160_02e1), "smultt  r0, r1, r2");
    }

    #[test]
    fn decode_multiplies() {
        assert_eq!(decode_word(0xe000_0291), "mul     r0, r1, r2");
        assert_eq!(decode_word(0xe010_0291), "muls    r0, r1, r2");
        assert_eq!(decode_word(0xe020_3291), "mla     r0, r1, r2, r3");
        assert_eq!(decode_word(0xe081_0392), "umull   r0, r1, r2, r3");
        assert_eq!(decode_word(0xe0c1_0392), "smull   r0, r1, r2, r3");
    }

    #[test]
    fn decode_extra_loadstor() {
        assert_eq!(decode_word(0xe1d1_00b2), "ldrh    r0, [r1, #2]");
        assert_eq!(decode_word(0xe1c1_00b2), "strh    r0, [r1, #2]");
        assert_eq!(decode_word(0xe191_00d2), "ldrsb   r0, [r1, r2]");
        assert_eq!(decode_word(0xe1c3_20d0), "ldrd    r2, [r3, #0]");
        assert_eq!(decode_word(0xe103_1092), "swp     r1, r2, [r3]");
        assert_eq!(decode_word(0xe192_1f9f), "ldrex   r1, [r2]");
        assert_eq!(decode_word(0xe182_0f91), "strex   r0, r1, [r2]");
    }

    #[test]
    fn decode_loadstor() {
        assert_eq!(decode_word(0xe591_0004), "ldr     r0, [r1, #4]");
        assert_eq!(decode_word(0xe5d1_0004), "ldrb    r0, [r1, #4]");
        assert_eq!(decode_word(0xe401_0004), "str     r0, [r1], #-4");
        assert_eq!(decode_word(0xe5a1_0004), "str     r0, [r1, #4]!");
        assert_eq!(decode_word(0xe791_0102), "ldr     r0, [r1, r2, lsl #2]");
        assert_eq!(decode_word(0xe701_0002), "str     r0, [r1, -r2]");
        assert_eq!(decode_word(0xf5d1_f004), "pld     [r1, #4]");
    }

    #[test]
    fn literal_load_marks_pool_with_arm_pc_offset() {
        let mut disasm = Disassembler::new(Options {
            comments: true,
            ..Options::default()
        });
        disasm.set_address(0x0800_0000);
        assert!(disasm.step_arm(0xe59f_0008));
        assert_eq!(disasm.text(), "ldr     r0, [pc, #8]    ; 0x8000010");
        assert_eq!(disasm.ldr_target(), Some(0x0800_0010));
        assert_eq!(disasm.address_type(0x0800_0010), PoolKind::Literal);
    }

    #[test]
    fn decode_media() {
        assert_eq!(decode_word(0xe6bf_0f31), "rev     r0, r1");
        assert_eq!(decode_word(0xe6bf_0fb1), "rev16   r0, r1");
        assert_eq!(decode_word(0xe6ff_0fb1), "revsh   r0, r1");
        assert_eq!(decode_word(0xe6af_0071), "sxtb    r0, r1");
        assert_eq!(decode_word(0xe6ef_0071), "uxtb    r0, r1");
        assert_eq!(decode_word(0xe6a2_0071), "sxtab   r0, r2, r1");
        assert_eq!(decode_word(0xe681_0012), "pkhbt   r0, r1, r2");
        assert_eq!(decode_word(0xe681_0fb2), "sel     r0, r1, r2");
        assert_eq!(decode_word(0xe611_0f92), "sadd8   r0, r1, r2");
    }

    #[test]
    fn push_pop_aliases() {
        assert_eq!(decode_word(0xe92d_4010), "push    {r4, lr}");
        assert_eq!(decode_word(0xe8bd_8010), "pop     {r4, pc}");
        // same bits with a different base register or no writeback
        assert_eq!(decode_word(0xe920_4010), "stmdb   r0!, {r4, lr}");
        assert_eq!(decode_word(0xe89d_0011), "ldmia   sp, {r0, r4}");
        assert_eq!(decode_word(0xe8d1_0001), "ldmia   r1, {r0}^");
    }

    #[test]
    fn decode_branches() {
        let mut disasm = Disassembler::new(Options::default());
        disasm.set_address(0x0800_0000);
        assert!(disasm.step_arm(0xea00_0000));
        assert_eq!(disasm.text(), "b       8000008");
        assert_eq!(disasm.address_type(0x0800_0008), PoolKind::Code);

        assert_eq!(decode_word(0xebff_fffe), "bl      8000000");
        assert_eq!(decode_word(0x0a00_0000), "beq     8000008");
    }

    #[test]
    fn branch_targets_comment_known_symbols() {
        let mut disasm = Disassembler::new(Options {
            comments: true,
            ..Options::default()
        });
        disasm.set_address(0x0800_0000);
        disasm.add_symbol("main", 0x0800_0008, SymbolMode::Arm);
        disasm.step_arm(0xea00_0000);
        assert_eq!(disasm.text(), "b       8000008         ; main");
    }

    #[test]
    fn decode_coprocessor() {
        assert_eq!(decode_word(0xee31_0f82), "cdp     15, 3, cr0, cr1, cr2, {4}");
        assert_eq!(decode_word(0xee01_0f10), "mcr     15, 0, r0, cr1, cr0, {0}");
        assert_eq!(decode_word(0xee11_0f10), "mrc     15, 0, r0, cr1, cr0, {0}");
        assert_eq!(decode_word(0xfe11_0f10), "mrc2    15, 0, r0, cr1, cr0, {0}");
        assert_eq!(decode_word(0xed92_0104), "ldc     1, cr0, [r2, #16]");
        assert_eq!(decode_word(0xec41_0e72), "mcrr    14, 7, r0, r1, cr2");
    }

    #[test]
    fn decode_svc() {
        assert_eq!(decode_word(0xef00_002a), "svc     0x0000002a");
        assert_eq!(decode_word(0x1f00_002a), "svcne   0x0000002a");
    }
}
