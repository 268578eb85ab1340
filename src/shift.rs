//! Barrel-shifter operand spelling.

use serde::{Deserialize, Serialize};

/// The shift applied to a register operand.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftKind {
    Lsl = 0,
    Lsr = 1,
    Asr = 2,
    Ror = 3,
}

impl From<u32> for ShiftKind {
    fn from(op: u32) -> Self {
        match op {
            0 => Self::Lsl,
            1 => Self::Lsr,
            2 => Self::Asr,
            3 => Self::Ror,
            _ => unreachable!(),
        }
    }
}

impl std::fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lsl => f.write_str("lsl"),
            Self::Lsr => f.write_str("lsr"),
            Self::Asr => f.write_str("asr"),
            Self::Ror => f.write_str("ror"),
        }
    }
}

/// Canonical spelling of an immediate shift operand.
///
/// The encodings reuse a zero count for special meanings: `lsl #0` is the
/// identity (nothing is printed), `lsr #0`/`asr #0` stand for a shift by 32,
/// and `ror #0` is the rotate-through-carry `rrx #1`.
pub(crate) fn decode_imm_shift(kind: u32, count: u32) -> String {
    let kind = ShiftKind::from(kind);
    match kind {
        ShiftKind::Lsl => {
            if count == 0 {
                String::new()
            } else {
                format!("{kind} #{count}")
            }
        }
        ShiftKind::Lsr | ShiftKind::Asr => {
            let count = if count == 0 { 32 } else { count };
            format!("{kind} #{count}")
        }
        ShiftKind::Ror => {
            if count == 0 {
                String::from("rrx #1")
            } else {
                format!("{kind} #{count}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_counts() {
        assert_eq!(decode_imm_shift(0, 3), "lsl #3");
        assert_eq!(decode_imm_shift(1, 7), "lsr #7");
        assert_eq!(decode_imm_shift(2, 31), "asr #31");
        assert_eq!(decode_imm_shift(3, 16), "ror #16");
    }

    #[test]
    fn zero_count_specials() {
        assert_eq!(decode_imm_shift(0, 0), "");
        assert_eq!(decode_imm_shift(1, 0), "lsr #32");
        assert_eq!(decode_imm_shift(2, 0), "asr #32");
        assert_eq!(decode_imm_shift(3, 0), "rrx #1");
    }
}
