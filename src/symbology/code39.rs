//! Code 39 with a mod-43 check character.
//!
//! Only the 43 native characters are accepted; there is no full-ASCII
//! mode, so lower-case input is rejected.

use super::{BarModel, EncodeError};

const ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

/// Nine-element patterns (bar, space, bar, ...), bit set = wide element.
const PATTERNS: [u16; 43] = [
    0x034, 0x121, 0x061, 0x160, 0x031, 0x130, 0x070, 0x025, 0x124, 0x064, // 0-9
    0x109, 0x049, 0x148, 0x019, 0x118, 0x058, 0x00D, 0x10C, 0x04C, 0x01C, // A-J
    0x103, 0x043, 0x142, 0x013, 0x112, 0x052, 0x007, 0x106, 0x046, 0x016, // K-T
    0x181, 0x0C1, 0x1C0, 0x091, 0x190, 0x0D0, 0x085, 0x184, 0x0C4, 0x0A8, // U-$
    0x0A2, 0x08A, 0x02A, // / + %
];

const START_STOP: u16 = 0x094;

const NARROW: usize = 1;
const WIDE: usize = 3;

pub fn encode(text: &str) -> Result<BarModel, EncodeError> {
    let mut values = Vec::with_capacity(text.len() + 1);
    for c in text.chars() {
        match ALPHABET.find(c) {
            Some(value) => values.push(value),
            None => {
                return Err(EncodeError::InvalidCharacter {
                    symbology: "code39",
                    character: c,
                })
            }
        }
    }

    let check = values.iter().sum::<usize>() % ALPHABET.len();
    values.push(check);

    let mut modules = Vec::new();
    push_character(&mut modules, START_STOP);
    for value in values {
        modules.push(false);
        push_character(&mut modules, PATTERNS[value]);
    }
    modules.push(false);
    push_character(&mut modules, START_STOP);

    Ok(BarModel::linear(modules))
}

fn push_character(modules: &mut Vec<bool>, pattern: u16) {
    for element in 0..9 {
        let wide = pattern & (1 << (8 - element)) != 0;
        let dark = element % 2 == 0;
        let width = if wide { WIDE } else { NARROW };
        modules.extend(std::iter::repeat(dark).take(width));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 6 narrow + 3 wide elements
    const CHAR_WIDTH: u32 = 6 * NARROW as u32 + 3 * WIDE as u32;

    #[test]
    fn test_width_includes_check_and_guards() {
        let model = encode("ABC").unwrap();
        // start, 3 data, check, stop, separated by one narrow gap each
        let chars = 6;
        assert_eq!(model.width(), chars * CHAR_WIDTH + (chars - 1));
        assert_eq!(model.height(), 1);
    }

    #[test]
    fn test_starts_and_ends_with_bars() {
        let model = encode("CODE-39").unwrap();
        assert!(model.is_dark(0, 0));
        assert!(model.is_dark(model.width() - 1, 0));
    }

    #[test]
    fn test_rejects_lowercase() {
        let err = encode("abc").unwrap_err();
        assert_eq!(
            err,
            EncodeError::InvalidCharacter {
                symbology: "code39",
                character: 'a'
            }
        );
    }

    #[test]
    fn test_rejects_asterisk() {
        assert!(encode("A*B").is_err());
    }

    #[test]
    fn test_every_pattern_has_three_wide_elements() {
        for pattern in PATTERNS.iter().chain(std::iter::once(&START_STOP)) {
            assert_eq!(pattern.count_ones(), 3, "pattern {:#x}", pattern);
        }
    }
}
