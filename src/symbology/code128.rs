//! Code 128 with automatic code-set selection.
//!
//! Set C packs runs of four or more digits two per symbol; set A is used
//! for control characters; everything else goes through set B.

use super::{BarModel, EncodeError};

/// Module patterns for symbol values 0..=105, eleven modules each.
const PATTERNS: [u16; 106] = [
    0b11011001100, 0b11001101100, 0b11001100110, 0b10010011000, 0b10010001100,
    0b10001001100, 0b10011001000, 0b10011000100, 0b10001100100, 0b11001001000,
    0b11001000100, 0b11000100100, 0b10110011100, 0b10011011100, 0b10011001110,
    0b10111001100, 0b10011101100, 0b10011100110, 0b11001110010, 0b11001011100,
    0b11001001110, 0b11011100100, 0b11001110100, 0b11101101110, 0b11101001100,
    0b11100101100, 0b11100100110, 0b11101100100, 0b11100110100, 0b11100110010,
    0b11011011000, 0b11011000110, 0b11000110110, 0b10100011000, 0b10001011000,
    0b10001000110, 0b10110001000, 0b10001101000, 0b10001100010, 0b11010001000,
    0b11000101000, 0b11000100010, 0b10110111000, 0b10110001110, 0b10001101110,
    0b10111011000, 0b10111000110, 0b10001110110, 0b11101110110, 0b11010001110,
    0b11000101110, 0b11011101000, 0b11011100010, 0b11011101110, 0b11101011000,
    0b11101000110, 0b11100010110, 0b11101101000, 0b11101100010, 0b11100011010,
    0b11101111010, 0b11001000010, 0b11110001010, 0b10100110000, 0b10100001100,
    0b10010110000, 0b10010000110, 0b10000101100, 0b10000100110, 0b10110010000,
    0b10110000100, 0b10011010000, 0b10011000010, 0b10000110100, 0b10000110010,
    0b11000010010, 0b11001010000, 0b11110111010, 0b11000010100, 0b10001111010,
    0b10100111100, 0b10010111100, 0b10010011110, 0b10111100100, 0b10011110100,
    0b10011110010, 0b11110100100, 0b11110010100, 0b11110010010, 0b11011011110,
    0b11011110110, 0b11110110110, 0b10101111000, 0b10100011110, 0b10001011110,
    0b10111101000, 0b10111100010, 0b11110101000, 0b11110100010, 0b10111011110,
    0b10111101110, 0b11101011110, 0b11110101110, 0b11010000100, 0b11010010000,
    0b11010011100,
];

const STOP: u16 = 0b1100011101011;
const STOP_WIDTH: u32 = 13;
const SYMBOL_WIDTH: u32 = 11;

const CODE_C: u16 = 99;
const CODE_B: u16 = 100;
const CODE_A: u16 = 101;
const START_A: u16 = 103;
const START_B: u16 = 104;
const START_C: u16 = 105;

const CHECKSUM_MODULUS: u16 = 103;

/// Shortest digit run worth switching to set C for.
const MIN_DIGIT_RUN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeSet {
    A,
    B,
    C,
}

impl CodeSet {
    fn for_byte(byte: u8) -> Self {
        if byte < 32 {
            CodeSet::A
        } else {
            CodeSet::B
        }
    }

    fn start(self) -> u16 {
        match self {
            CodeSet::A => START_A,
            CodeSet::B => START_B,
            CodeSet::C => START_C,
        }
    }

    fn switch(self) -> u16 {
        match self {
            CodeSet::A => CODE_A,
            CodeSet::B => CODE_B,
            CodeSet::C => CODE_C,
        }
    }

    fn fits(self, byte: u8) -> bool {
        match self {
            CodeSet::A => byte < 96,
            CodeSet::B => byte >= 32,
            CodeSet::C => byte.is_ascii_digit(),
        }
    }

    fn value(self, byte: u8) -> u16 {
        match self {
            CodeSet::A if byte < 32 => u16::from(byte) + 64,
            _ => u16::from(byte) - 32,
        }
    }
}

pub fn encode(text: &str) -> Result<BarModel, EncodeError> {
    let symbols = codewords(text)?;

    let mut modules = Vec::with_capacity(symbols.len() * SYMBOL_WIDTH as usize);
    for &symbol in &symbols {
        push_pattern(&mut modules, PATTERNS[symbol as usize], SYMBOL_WIDTH);
    }
    push_pattern(&mut modules, STOP, STOP_WIDTH);

    Ok(BarModel::linear(modules))
}

/// Symbol values from start character through check character.
fn codewords(text: &str) -> Result<Vec<u16>, EncodeError> {
    if let Some(character) = text.chars().find(|c| !c.is_ascii()) {
        return Err(EncodeError::InvalidCharacter {
            symbology: "code128",
            character,
        });
    }
    let bytes = text.as_bytes();
    let Some(&first) = bytes.first() else {
        return Err(EncodeError::Empty);
    };

    let leading = digit_run(bytes);
    let mut set = if leading >= MIN_DIGIT_RUN && leading % 2 == 0 {
        CodeSet::C
    } else {
        CodeSet::for_byte(first)
    };

    let mut values = vec![set.start()];
    let mut i = 0;
    while i < bytes.len() {
        let digits = digit_run(&bytes[i..]);

        if set != CodeSet::C && digits >= MIN_DIGIT_RUN {
            if digits % 2 == 1 {
                values.push(set.value(bytes[i]));
                i += 1;
                continue;
            }
            set = CodeSet::C;
            values.push(set.switch());
            continue;
        }

        if set == CodeSet::C {
            if digits >= 2 {
                values.push(u16::from(bytes[i] - b'0') * 10 + u16::from(bytes[i + 1] - b'0'));
                i += 2;
            } else {
                set = CodeSet::for_byte(bytes[i]);
                values.push(set.switch());
            }
            continue;
        }

        if !set.fits(bytes[i]) {
            set = CodeSet::for_byte(bytes[i]);
            values.push(set.switch());
        }
        values.push(set.value(bytes[i]));
        i += 1;
    }

    let weighted = values
        .iter()
        .enumerate()
        .skip(1)
        .fold(u32::from(values[0]), |sum, (position, &value)| {
            sum + position as u32 * u32::from(value)
        });
    values.push((weighted % u32::from(CHECKSUM_MODULUS)) as u16);

    Ok(values)
}

fn digit_run(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn push_pattern(modules: &mut Vec<bool>, pattern: u16, width: u32) {
    for bit in (0..width).rev() {
        modules.push(pattern & (1 << bit) != 0);
    }
}
