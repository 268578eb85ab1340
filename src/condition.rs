//! # ARM Conditional Execution
//!
//! Almost every A32 instruction carries a condition in its top 4 bits, and
//! Thumb code reaches the same predicates through conditional branches and
//! `IT` blocks. The disassembler only needs the *names*: the two-letter
//! suffix appended to a mnemonic (`beq`, `addne`, ...).
//!
//! ```text
//! ┌───────┬────────┬─────────────────────┬─────────────────────────────────┐
//! │ Code  │ Suffix │     Meaning         │          Flags Tested           │
//! ├───────┼────────┼─────────────────────┼─────────────────────────────────┤
//! │ 0000  │   eq   │ Equal               │ Z=1                             │
//! │ 0001  │   ne   │ Not equal           │ Z=0                             │
//! │ 0010  │   cs   │ Carry set / ≥ (uns) │ C=1                             │
//! │ 0011  │   cc   │ Carry clear / < (u) │ C=0                             │
//! │ 0100  │   mi   │ Minus / negative    │ N=1                             │
//! │ 0101  │   pl   │ Plus / non-negative │ N=0                             │
//! │ 0110  │   vs   │ Overflow set        │ V=1                             │
//! │ 0111  │   vc   │ Overflow clear      │ V=0                             │
//! │ 1000  │   hi   │ Higher (unsigned)   │ C=1 AND Z=0                     │
//! │ 1001  │   ls   │ Lower/same (unsig)  │ C=0 OR Z=1                      │
//! │ 1010  │   ge   │ ≥ (signed)          │ N=V                             │
//! │ 1011  │   lt   │ < (signed)          │ N≠V                             │
//! │ 1100  │   gt   │ > (signed)          │ Z=0 AND N=V                     │
//! │ 1101  │   le   │ ≤ (signed)          │ Z=1 OR N≠V                      │
//! │ 1110  │   al   │ Always              │ (no suffix printed)             │
//! │ 1111  │   nv   │ Never / special     │ (no suffix printed)             │
//! └───────┴────────┴─────────────────────┴─────────────────────────────────┘
//! ```
//!
//! `AL` prints nothing (unconditional is the default in assembly), and `NV`
//! is never reached through the suffix path: the A32 handlers treat
//! condition 15 as the unconditional-extension space (`pld`, `blx`, the
//! `...2` coprocessor variants) before any suffix is emitted.

use serde::{Deserialize, Serialize};

/// Condition codes for ARM conditional execution.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub enum Condition {
    /// Equal (Z=1)
    EQ = 0x0,
    /// Not equal (Z=0)
    NE = 0x1,
    /// Carry set / unsigned higher or same (C=1)
    CS = 0x2,
    /// Carry clear / unsigned lower (C=0)
    CC = 0x3,
    /// Minus / negative (N=1)
    MI = 0x4,
    /// Plus / positive or zero (N=0)
    PL = 0x5,
    /// Overflow set (V=1)
    VS = 0x6,
    /// Overflow clear (V=0)
    VC = 0x7,
    /// Unsigned higher (C=1 AND Z=0)
    HI = 0x8,
    /// Unsigned lower or same (C=0 OR Z=1)
    LS = 0x9,
    /// Signed greater or equal (N=V)
    GE = 0xA,
    /// Signed less than (N≠V)
    LT = 0xB,
    /// Signed greater than (Z=0 AND N=V)
    GT = 0xC,
    /// Signed less than or equal (Z=1 OR N≠V)
    LE = 0xD,
    /// Always (unconditional, prints no suffix)
    AL = 0xE,
    /// Never / unconditional-extension space (prints no suffix)
    NV = 0xF,
}

impl From<u8> for Condition {
    fn from(item: u8) -> Self {
        match item {
            0x0 => Self::EQ,
            0x1 => Self::NE,
            0x2 => Self::CS,
            0x3 => Self::CC,
            0x4 => Self::MI,
            0x5 => Self::PL,
            0x6 => Self::VS,
            0x7 => Self::VC,
            0x8 => Self::HI,
            0x9 => Self::LS,
            0xA => Self::GE,
            0xB => Self::LT,
            0xC => Self::GT,
            0xD => Self::LE,
            0xE => Self::AL,
            0xF => Self::NV,
            _ => unreachable!(),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EQ => f.write_str("eq"),
            Self::NE => f.write_str("ne"),
            Self::CS => f.write_str("cs"),
            Self::CC => f.write_str("cc"),
            Self::MI => f.write_str("mi"),
            Self::PL => f.write_str("pl"),
            Self::VS => f.write_str("vs"),
            Self::VC => f.write_str("vc"),
            Self::HI => f.write_str("hi"),
            Self::LS => f.write_str("ls"),
            Self::GE => f.write_str("ge"),
            Self::LT => f.write_str("lt"),
            Self::GT => f.write_str("gt"),
            Self::LE => f.write_str("le"),
            Self::AL | Self::NV => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn suffixes() {
        assert_eq!(Condition::from(0x0).to_string(), "eq");
        assert_eq!(Condition::from(0x1).to_string(), "ne");
        assert_eq!(Condition::from(0x8).to_string(), "hi");
        assert_eq!(Condition::from(0xD).to_string(), "le");
    }

    #[test]
    fn always_and_never_print_nothing() {
        assert_eq!(Condition::AL.to_string(), "");
        assert_eq!(Condition::NV.to_string(), "");
    }

    #[test]
    fn round_trip() {
        for code in 0..=0xF_u8 {
            assert_eq!(Condition::from(code) as u8, code);
        }
    }
}
