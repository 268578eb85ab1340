//! Thumb-2 "modified immediate" expansion.

use crate::bitwise::Bits;

/// Expands the 12-bit `i:imm3:imm8` modified-immediate encoding to its
/// 32-bit value.
///
/// When the top two bits of the 12-bit value are zero, the low byte is
/// replicated into one of four patterns selected by bits 9:8:
///
/// ```text
/// 00  00000000 00000000 00000000 abcdefgh
/// 01  00000000 abcdefgh 00000000 abcdefgh
/// 10  abcdefgh 00000000 abcdefgh 00000000
/// 11  abcdefgh abcdefgh abcdefgh abcdefgh
/// ```
///
/// Otherwise the low 7 bits, with bit 7 forced on, are rotated right by the
/// top 5 bits.
pub(crate) fn expand_mod_imm(imm1: u32, imm3: u32, imm8: u32) -> i32 {
    let imm12 = (imm1 << 11) | (imm3 << 8) | imm8;
    if imm12 & 0x0c00 == 0 {
        let byte = imm12 & 0xff;
        (match imm12.get_bits(8..=9) {
            0 => imm12,
            1 => (byte << 16) | byte,
            2 => (byte << 24) | (byte << 8),
            3 => (byte << 24) | (byte << 16) | (byte << 8) | byte,
            _ => unreachable!(),
        }) as i32
    } else {
        let value = (imm12 & 0x7f) | 0x80;
        let rot = imm12.get_bits(7..=11);
        value.rotate_right(rot) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn replicated_patterns() {
        assert_eq!(expand_mod_imm(0, 0, 0xab), 0xab);
        assert_eq!(expand_mod_imm(0, 1, 0xab), 0x00ab_00ab);
        assert_eq!(expand_mod_imm(0, 2, 0xab), 0xab00_ab00_u32 as i32);
        assert_eq!(expand_mod_imm(0, 3, 0xab), 0xabab_abab_u32 as i32);
        assert_eq!(expand_mod_imm(0, 3, 0xff), -1);
    }

    #[test]
    fn rotated_byte() {
        // i:imm3:imm8 = 0100 1111 1111 -> 0xff ror 9
        assert_eq!(expand_mod_imm(0, 4, 0xff), 0x7f80_0000);
        // the top bit of the rotated byte is forced on, so 0x7f expands the same
        assert_eq!(expand_mod_imm(0, 4, 0x7f), 0x7f80_0000);
        // i:imm3:imm8 = 1000 0000 0000 -> 0x80 ror 16
        assert_eq!(expand_mod_imm(1, 0, 0x00), 0x0080_0000);
    }

    /// Checks every valid `i:imm3:imm8` triple against a direct rendering of
    /// the `ARMv7-M` pseudo-code (`ThumbExpandImm`).
    #[test]
    fn matches_reference_expansion() {
        for imm12 in 0..0x1000_u32 {
            let (imm1, imm3, imm8) = (imm12 >> 11, (imm12 >> 8) & 0x7, imm12 & 0xff);
            let expected = if imm12 >> 10 == 0 {
                let b = imm12 & 0xff;
                match (imm12 >> 8) & 0x3 {
                    0 => b,
                    1 => b | (b << 16),
                    2 => (b << 8) | (b << 24),
                    _ => b | (b << 8) | (b << 16) | (b << 24),
                }
            } else {
                let unrotated = 0x80 | (imm12 & 0x7f);
                unrotated.rotate_right(imm12 >> 7)
            };
            assert_eq!(expand_mod_imm(imm1, imm3, imm8) as u32, expected, "imm12 = {imm12:#05x}");
        }
    }
}
