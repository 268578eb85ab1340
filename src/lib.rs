//! # disarm
//!
//! A disassembler for the 32-bit ARM architecture: the classic A32
//! instruction set plus the Thumb and Thumb-2 encodings used by Cortex-M
//! class cores (including the common single-precision VFP operations).
//!
//! Feed [`Disassembler`] a stream of halfwords (Thumb) or words (ARM) and
//! it produces a textual listing line by line, resolving PC-relative
//! targets, telling inline literal data apart from code, carrying `IT`
//! block state across instructions and optionally annotating each line
//! with the address, the raw encoding and symbolic comments.
//!
//! ```
//! use disarm::{Disassembler, Options};
//!
//! let mut disasm = Disassembler::new(Options::from_bits(Options::COMMENT));
//! disasm.set_address(0x0800_0100);
//! disasm.step_thumb(0xb510, 0);
//! assert_eq!(disasm.text(), "push    {r4, lr}");
//! disasm.step_thumb(0x4801, 0);
//! assert_eq!(disasm.text(), "ldr     r0, [pc, #4]    ; 0x8000108");
//! ```

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
mod bitwise;

mod condition;
mod immediate;
mod pool;
mod registers;
mod shift;
mod symbols;

#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_sign_loss)]
mod arm;
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_sign_loss)]
mod thumb;
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_sign_loss)]
mod thumb2;

mod disasm;

pub use condition::Condition;
pub use disasm::{Disassembler, Options};
pub use pool::PoolKind;
pub use shift::ShiftKind;
pub use symbols::SymbolMode;
