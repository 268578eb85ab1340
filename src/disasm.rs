//! # Decoder session
//!
//! [`Disassembler`] owns everything a decode step needs: the current
//! address, the output line, the open `IT` block (if any), the
//! code/literal map and the symbol table. One session walks one stream of
//! instructions; distinct sessions are fully independent (there is no
//! global state).
//!
//! The drivers ([`Disassembler::step_thumb`] / [`Disassembler::step_arm`])
//! advance the address by the previous instruction's size, consult the
//! code/literal map, dispatch into the pattern tables and fall back to a
//! `.word`/`.hword` data line when nothing matches. The emitted line for
//! the current instruction is available through [`Disassembler::result`]
//! until the next step.
//!
//! ```
//! use disarm::{Disassembler, Options};
//!
//! let mut disasm = Disassembler::new(Options::default());
//! disasm.set_address(0x0800_0100);
//! disasm.step_thumb(0x4770, 0);
//! assert_eq!(disasm.text(), "bx      lr");
//! ```

use std::fmt::Write as _;

use crate::bitwise::Bits;
use crate::condition::Condition;
use crate::pool::{CodeMap, PoolKind};
use crate::registers::register_name;
use crate::symbols::{SymbolMode, SymbolTable};
use crate::{arm, thumb};

/// Upper bound for an emitted line, prefix columns included.
const TEXT_CAPACITY: usize = 128;

/// Width of the address prefix and of the raw-encoding prefix.
const PREFIX_WIDTH: usize = 12;

/// Column at which comments start (when the operands leave room).
const COMMENT_COLUMN: usize = 24;

/// Output options for a decoder session.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Prefix each line with the instruction address.
    pub address: bool,
    /// Prefix each line with the raw encoding in hex.
    pub encoding: bool,
    /// Append `; ...` comments (hex values, symbols, ASCII data).
    pub comments: bool,
}

impl Options {
    /// Flag bit: prefix decoded instructions with the address.
    pub const ADDRESS: u32 = 0x0001;
    /// Flag bit: prefix decoded instructions with the raw encoding.
    pub const INSTR: u32 = 0x0002;
    /// Flag bit: add comments with symbols or extra information.
    pub const COMMENT: u32 = 0x0004;

    /// Builds options from the `ADDRESS`/`INSTR`/`COMMENT` flag bits.
    #[must_use]
    pub const fn from_bits(flags: u32) -> Self {
        Self {
            address: flags & Self::ADDRESS != 0,
            encoding: flags & Self::INSTR != 0,
            comments: flags & Self::COMMENT != 0,
        }
    }

    /// All three options enabled.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            address: true,
            encoding: true,
            comments: true,
        }
    }
}

/// A disassembler session.
///
/// See the [module-level documentation](self) for the decode loop.
#[derive(Debug, Default)]
pub struct Disassembler {
    /// Address of the instruction being decoded (used for branch targets
    /// and literal-pool references).
    pub(crate) address: u32,
    /// Size in bytes of the most recently decoded instruction; the next
    /// step advances `address` by this amount before decoding.
    pub(crate) size: u16,
    /// True while decoding in ARM (A32) state, false in Thumb state.
    pub(crate) arm_mode: bool,
    /// The emitted line for the current instruction.
    pub(crate) text: String,
    options: Options,
    /// Forward-carried state of an open `IT` block: the low 4 bits hold the
    /// remaining then/else flags, bit 4 the first-condition parity and bit 5
    /// a one-shot marker for the `IT` instruction itself.
    pub(crate) it_mask: u16,
    pub(crate) it_cond: u16,
    /// Target of the most recent PC-relative load, if any.
    pub(crate) ldr_addr: Option<u32>,
    symbols: SymbolTable,
    codepool: CodeMap,
}

impl Disassembler {
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Sets the address the next step decodes at, and marks it as code.
    /// The next step will not advance past it.
    pub fn set_address(&mut self, address: u32) {
        self.address = address;
        self.size = 0;
        self.codepool.mark(address, PoolKind::Code);
    }

    /// Registers a symbol for comment annotation. The list is kept sorted
    /// on address; a second symbol at the same address is ignored. A Thumb
    /// code symbol also marks its address as code.
    pub fn add_symbol(&mut self, name: &str, address: u32, mode: SymbolMode) {
        if self.symbols.insert(name, address, mode) && mode == SymbolMode::Thumb {
            self.codepool.mark(address, PoolKind::Code);
        }
    }

    /// Erases the code/literal map built up during disassembly.
    pub fn clear_codepool(&mut self) {
        self.codepool.clear();
    }

    /// The emitted line for the most recently decoded instruction.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Size in bytes of the most recently decoded instruction (2 or 4; 0
    /// before the first step).
    #[must_use]
    pub const fn size(&self) -> u16 {
        self.size
    }

    /// The emitted line and the instruction size, as a pair.
    #[must_use]
    pub fn result(&self) -> (&str, u16) {
        (&self.text, self.size)
    }

    /// Target address of the most recent PC-relative load, when the last
    /// decoded instruction was one.
    #[must_use]
    pub const fn ldr_target(&self) -> Option<u32> {
        self.ldr_addr
    }

    /// Decodes the next Thumb instruction. `hw1` is the halfword at the
    /// current address; `hw2` is the following halfword and is only used
    /// when the instruction turns out to be 32-bit.
    ///
    /// Returns false when the bytes match no encoding; the line then holds
    /// a `.word`/`.hword` data declaration. Addresses the map classifies as
    /// literal-pool data are emitted as `.word` without decoding (and
    /// return true).
    pub fn step_thumb(&mut self, hw1: u16, hw2: u16) -> bool {
        self.address = self.address.wrapping_add(u32::from(self.size));
        self.arm_mode = false;
        self.ldr_addr = None;
        self.size = 0;
        self.text.clear();

        if self.codepool.lookup(self.address) == PoolKind::Literal {
            self.size = 4;
            self.dump_word((u32::from(hw2) << 16) | u32::from(hw1));
            return true;
        }

        let instr = if thumb::is_32bit(hw1) {
            (u32::from(hw1) << 16) | u32::from(hw2)
        } else {
            u32::from(hw1)
        };
        // the table is ordered: the first mask match is authoritative, even
        // when its handler rejects the pattern
        if let Some(encoding) = thumb::TABLE.iter().find(|encoding| hw1 & encoding.mask == encoding.value)
            && (encoding.decode)(self, instr)
        {
            self.insert_prefix(instr);
            self.advance_it_state();
            return true;
        }

        // an invalid instruction closes any open IT block
        self.it_mask = 0;
        self.size = if thumb::is_32bit(hw1) { 4 } else { 2 };
        tracing::debug!("no Thumb encoding matches {instr:#x}, emitting data");
        self.text.clear();
        self.dump_word(instr);
        false
    }

    /// Decodes the next ARM (A32) instruction. Returns false when the word
    /// matches no encoding; the line then holds a `.word` data declaration.
    pub fn step_arm(&mut self, word: u32) -> bool {
        self.address = self.address.wrapping_add(u32::from(self.size));
        self.arm_mode = true;
        self.ldr_addr = None;
        self.size = 4;
        self.text.clear();

        if arm::decode(self, word) {
            self.insert_prefix(word);
            true
        } else {
            tracing::debug!("no ARM encoding matches {word:#010x}, emitting data");
            self.text.clear();
            self.dump_word(word);
            false
        }
    }

    /// Sweeps a byte buffer, invoking `callback(address, text)` for every
    /// decoded line. `mode` selects ARM or Thumb decoding for the whole
    /// buffer. Trailing bytes that do not fill a halfword (or word, in ARM
    /// mode) are not decoded. Returns false when the callback stopped the
    /// sweep.
    pub fn decode_buffer(
        &mut self,
        buffer: &[u8],
        mode: SymbolMode,
        mut callback: impl FnMut(u32, &str) -> bool,
    ) -> bool {
        let mut offset = 0_usize;
        if mode == SymbolMode::Arm {
            while offset + 4 <= buffer.len() {
                let word = u32::from_le_bytes(buffer[offset..offset + 4].try_into().unwrap());
                self.step_arm(word);
                if !callback(self.address, &self.text) {
                    return false;
                }
                offset += usize::from(self.size);
            }
        } else {
            while offset + 2 <= buffer.len() {
                let hw1 = u16::from_le_bytes([buffer[offset], buffer[offset + 1]]);
                let hw2 = if offset + 4 <= buffer.len() {
                    u16::from_le_bytes([buffer[offset + 2], buffer[offset + 3]])
                } else {
                    0
                };
                self.step_thumb(hw1, hw2);
                if !callback(self.address, &self.text) {
                    return false;
                }
                offset += usize::from(self.size);
            }
        }
        true
    }

    // ------------------------------------------------------------------
    // text assembly, shared by the pattern handlers
    // ------------------------------------------------------------------

    /// Extends the mnemonic field to 8 characters, or separates a longer
    /// mnemonic from its operands with a single space.
    pub(crate) fn pad_mnemonic(&mut self) {
        debug_assert!(!self.text.is_empty());
        if self.text.len() < 8 {
            while self.text.len() < 8 {
                self.text.push(' ');
            }
        } else {
            self.text.push(' ');
        }
    }

    /// Appends the condition suffix (nothing for `al`).
    pub(crate) fn add_condition(&mut self, cond: u32) {
        _ = write!(self.text, "{}", Condition::from((cond & 0xf) as u8));
    }

    /// Appends the condition implied by an open `IT` block, inverted when
    /// the current mask bit disagrees with the first-condition parity.
    /// Outside an `IT` block, appends `s` instead when `add_s` is set (an
    /// instruction inside the block never prints its set-flags suffix).
    pub(crate) fn add_it_cond(&mut self, add_s: bool) {
        if self.it_mask != 0 {
            let mut cond = self.it_cond;
            if (self.it_mask >> 4) & 1 != cond & 1 {
                cond ^= 1;
            }
            self.add_condition(u32::from(cond));
        } else if add_s {
            self.text.push('s');
        }
    }

    /// Appends `{r0, r2-r4, lr}`-style register lists, coalescing runs of
    /// three or more adjacent registers into ranges.
    pub(crate) fn add_reglist(&mut self, mask: u32) {
        self.text.push('{');
        let mut count = 0;
        let mut reg = 0_u8;
        while reg < 16 {
            if mask.get_bit(reg) {
                if count > 0 {
                    self.text.push_str(", ");
                }
                self.text.push_str(register_name(u32::from(reg)));
                count += 1;
                let mut run_end = reg + 1;
                while run_end < 16 && mask.get_bit(run_end) {
                    run_end += 1;
                }
                run_end -= 1;
                if run_end - reg > 1 {
                    self.text.push('-');
                    self.text.push_str(register_name(u32::from(run_end)));
                    count += run_end - reg;
                    reg = run_end;
                }
            }
            reg += 1;
        }
        self.text.push('}');
    }

    /// Appends `; comment` at the comment column (at least two spaces after
    /// the operands). The comment is dropped entirely when it would not fit
    /// the line, accounting for the prefix columns inserted later.
    pub(crate) fn append_comment(&mut self, comment: &str) {
        debug_assert!(self.options.comments);
        let padding = COMMENT_COLUMN.saturating_sub(self.text.len()).max(2);
        let mut capacity = TEXT_CAPACITY;
        if self.options.address {
            capacity -= PREFIX_WIDTH;
        }
        if self.options.encoding {
            capacity -= PREFIX_WIDTH;
        }
        if self.text.len() + padding + 2 + comment.len() < capacity {
            for _ in 0..padding {
                self.text.push(' ');
            }
            self.text.push_str("; ");
            self.text.push_str(comment);
        }
    }

    /// Comments the hexadecimal rendering of `value` (values below 10 read
    /// the same in both bases and are skipped).
    pub(crate) fn append_comment_hex(&mut self, value: u32) {
        if self.options.comments && value >= 10 {
            let hex = format!("0x{value:x}");
            self.append_comment(&hex);
        }
    }

    /// Comments the name of the symbol at `address`, if one is known.
    pub(crate) fn append_comment_symbol(&mut self, address: u32) {
        if self.options.comments && !self.symbols.is_empty() {
            if let Some(symbol) = self.symbols.lookup(address) {
                let name = symbol.name.clone();
                self.append_comment(&name);
            }
        }
    }

    /// Records an address classification in the code/literal map (first
    /// write wins).
    pub(crate) fn mark_address_type(&mut self, address: u32, kind: PoolKind) {
        self.codepool.mark(address, kind);
    }

    #[cfg(test)]
    pub(crate) fn address_type(&self, address: u32) -> PoolKind {
        self.codepool.lookup(address)
    }

    /// Prepends the enabled address/raw-encoding prefix columns, 12
    /// characters each.
    fn insert_prefix(&mut self, instr: u32) {
        let mut prefix = String::new();
        if self.options.address {
            _ = write!(prefix, "{:08x}    ", self.address);
        }
        if self.options.encoding {
            if self.arm_mode {
                _ = write!(prefix, "{instr:08x}    ");
            } else if self.size == 4 {
                _ = write!(prefix, "{:04x} {:04x}   ", (instr >> 16) & 0xffff, instr & 0xffff);
            } else {
                _ = write!(prefix, "{:04x}        ", instr & 0xffff);
            }
        }
        if !prefix.is_empty() {
            self.text.insert_str(0, &prefix);
        }
    }

    /// Advances the sliding `IT` window after a successful decode.
    fn advance_it_state(&mut self) {
        if self.it_mask != 0 {
            if self.it_mask & 0x20 != 0 {
                // the IT instruction itself only sheds its one-shot marker
                self.it_mask &= 0x1f;
                debug_assert!(self.it_mask != 0);
            } else {
                self.it_mask = (self.it_mask << 1) & 0x1f;
                if self.it_mask == 0x10 {
                    self.it_mask = 0;
                }
            }
        }
    }

    /// Emits the bytes as a `.word`/`.hword` data declaration, with a
    /// symbol or ASCII comment for full words.
    fn dump_word(&mut self, word: u32) {
        if self.size == 4 {
            self.text.push_str(".word");
            self.pad_mnemonic();
            _ = write!(self.text, "0x{word:08x}");
        } else {
            self.text.push_str(".hword");
            self.pad_mnemonic();
            _ = write!(self.text, "0x{:04x}", word & 0xffff);
        }
        if self.options.comments && self.size == 4 {
            if self.symbols.lookup(word).is_some() {
                // the value is the address of a known symbol
                self.append_comment_symbol(word);
            } else {
                let bytes = word.to_le_bytes();
                let all_ascii = bytes
                    .iter()
                    .all(|&byte| byte.is_ascii_graphic() || matches!(byte, b' ' | 0 | b'\n' | b'\r' | b'\t'));
                if all_ascii {
                    let mut field = String::from('"');
                    for byte in bytes {
                        match byte {
                            0 => field.push_str("\\0"),
                            b'\n' => field.push_str("\\n"),
                            b'\r' => field.push_str("\\r"),
                            b'\t' => field.push_str("\\t"),
                            _ => field.push(char::from(byte)),
                        }
                    }
                    field.push('"');
                    self.append_comment(&field);
                }
            }
        }
        self.insert_prefix(word);
    }
}
