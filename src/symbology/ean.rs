//! EAN-8 and EAN-13.
//!
//! The variant follows from the input length: 7 or 8 digits encode EAN-8,
//! 12 or 13 digits encode EAN-13. The shorter form gets its check digit
//! appended; the longer form must carry a correct one.

use super::{BarModel, EncodeError};

/// Left-hand odd parity ("L") patterns, seven modules each.
const L_PATTERNS: [u8; 10] = [
    0b0001101, 0b0011001, 0b0010011, 0b0111101, 0b0100011,
    0b0110001, 0b0101111, 0b0111011, 0b0110111, 0b0001011,
];

/// EAN-13 parity of the six left digits keyed by the leading digit; bit set = even ("G").
const FIRST_DIGIT_PARITY: [u8; 10] = [
    0b000000, 0b001011, 0b001101, 0b001110, 0b010011,
    0b011001, 0b011100, 0b010101, 0b010110, 0b011010,
];

const DIGIT_WIDTH: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parity {
    Odd,
    Even,
    Right,
}

pub fn encode(text: &str) -> Result<BarModel, EncodeError> {
    if let Some(character) = text.chars().find(|c| !c.is_ascii_digit()) {
        return Err(EncodeError::InvalidCharacter {
            symbology: "ean",
            character,
        });
    }
    let mut digits: Vec<u8> = text.bytes().map(|b| b - b'0').collect();

    match digits.len() {
        7 | 12 => digits.push(check_digit(&digits)),
        8 | 13 => {
            let (data, check) = digits.split_at(digits.len() - 1);
            if check_digit(data) != check[0] {
                return Err(EncodeError::ChecksumMismatch);
            }
        }
        length => return Err(EncodeError::InvalidLength { symbology: "ean", length }),
    }

    let mut modules = Vec::new();
    if digits.len() == 8 {
        encode_ean8(&digits, &mut modules);
    } else {
        encode_ean13(&digits, &mut modules);
    }
    Ok(BarModel::linear(modules))
}

/// Weight 3 for every other digit, starting from the rightmost data digit.
fn check_digit(data: &[u8]) -> u8 {
    let sum: u32 = data
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| if i % 2 == 0 { u32::from(d) * 3 } else { u32::from(d) })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

fn encode_ean8(digits: &[u8], modules: &mut Vec<bool>) {
    push_bits(modules, 0b101, 3);
    for &d in &digits[..4] {
        push_digit(modules, d, Parity::Odd);
    }
    push_bits(modules, 0b01010, 5);
    for &d in &digits[4..] {
        push_digit(modules, d, Parity::Right);
    }
    push_bits(modules, 0b101, 3);
}

fn encode_ean13(digits: &[u8], modules: &mut Vec<bool>) {
    let parity = FIRST_DIGIT_PARITY[digits[0] as usize];
    push_bits(modules, 0b101, 3);
    for (i, &d) in digits[1..7].iter().enumerate() {
        let even = parity & (1 << (5 - i)) != 0;
        push_digit(modules, d, if even { Parity::Even } else { Parity::Odd });
    }
    push_bits(modules, 0b01010, 5);
    for &d in &digits[7..] {
        push_digit(modules, d, Parity::Right);
    }
    push_bits(modules, 0b101, 3);
}

fn push_digit(modules: &mut Vec<bool>, digit: u8, parity: Parity) {
    let odd = L_PATTERNS[digit as usize];
    let right = !odd & 0x7f;
    let pattern = match parity {
        Parity::Odd => odd,
        Parity::Right => right,
        Parity::Even => right.reverse_bits() >> 1,
    };
    push_bits(modules, u16::from(pattern), DIGIT_WIDTH);
}

fn push_bits(modules: &mut Vec<bool>, bits: u16, width: u32) {
    for bit in (0..width).rev() {
        modules.push(bits & (1 << bit) != 0);
    }
}
