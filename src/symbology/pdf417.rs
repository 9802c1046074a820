//! PDF417 through `rxing`.

use rxing::{
    BarcodeFormat, EncodeHintType, EncodeHintValue, EncodingHintDictionary, MultiFormatWriter,
    Writer,
};

use super::{BarModel, EncodeError};

/// Highest error correction ("security") level PDF417 defines.
pub const MAX_SECURITY_LEVEL: i64 = 8;

pub fn encode(text: &str, security_level: i64) -> Result<BarModel, EncodeError> {
    if !(0..=MAX_SECURITY_LEVEL).contains(&security_level) {
        return Err(EncodeError::InvalidSecurityLevel(security_level));
    }

    let mut hints = EncodingHintDictionary::new();
    hints.insert(
        EncodeHintType::ERROR_CORRECTION,
        EncodeHintValue::ErrorCorrection(security_level.to_string()),
    );
    hints.insert(
        EncodeHintType::MARGIN,
        EncodeHintValue::Margin("0".to_owned()),
    );

    let matrix = MultiFormatWriter::default()
        .encode_with_hints(text, &BarcodeFormat::PDF_417, 0, 0, &hints)
        .map_err(|e| EncodeError::Symbol(e.to_string()))?;

    // BitMatrix renders each module as a two-character cell, "X " when set.
    let rows: Vec<Vec<bool>> = matrix
        .to_string()
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| line.chars().step_by(2).map(|c| c == 'X').collect())
        .collect();

    BarModel::matrix(rows)
        .ok_or_else(|| EncodeError::Symbol("pdf417 writer produced an irregular matrix".into()))
}
