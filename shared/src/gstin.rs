//! GSTIN and state code validation
//!
//! A GSTIN is 15 characters:
//!
//! | Pos | Content |
//! |-----|---------|
//! | 1-2 | state code (01-38, 97, 99) |
//! | 3-12 | PAN: 5 letters, 4 digits, 1 letter |
//! | 13 | entity number (1-9, A-Z) |
//! | 14 | always `Z` |
//! | 15 | mod-36 check character |

use crate::error::{ValidationError, ValidationResult};

const GSTIN_LEN: usize = 15;
const CHARSET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Validate a GSTIN, including its check character
pub fn validate_gstin(tax_id: &str) -> ValidationResult<()> {
    let bytes = tax_id.as_bytes();
    if bytes.len() != GSTIN_LEN {
        return Err(ValidationError::invalid_tax_id(
            tax_id,
            format!("expected {GSTIN_LEN} characters, got {}", tax_id.chars().count()),
        ));
    }
    if !bytes
        .iter()
        .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
    {
        return Err(ValidationError::invalid_tax_id(
            tax_id,
            "only digits and uppercase letters are allowed",
        ));
    }

    if normalize_state_code(&tax_id[..2]).is_err() {
        return Err(ValidationError::invalid_tax_id(tax_id, "unknown state code"));
    }

    let pan = &bytes[2..12];
    let pan_ok = pan[..5].iter().all(u8::is_ascii_uppercase)
        && pan[5..9].iter().all(u8::is_ascii_digit)
        && pan[9].is_ascii_uppercase();
    if !pan_ok {
        return Err(ValidationError::invalid_tax_id(tax_id, "malformed PAN segment"));
    }

    if bytes[12] == b'0' {
        return Err(ValidationError::invalid_tax_id(tax_id, "entity number cannot be 0"));
    }
    if bytes[13] != b'Z' {
        return Err(ValidationError::invalid_tax_id(tax_id, "14th character must be 'Z'"));
    }

    let expected = check_char(&bytes[..14]);
    if bytes[14] != expected {
        return Err(ValidationError::invalid_tax_id(
            tax_id,
            format!("check character mismatch, expected '{}'", expected as char),
        ));
    }

    Ok(())
}

/// Compute the mod-36 check character over the first 14 characters
fn check_char(body: &[u8]) -> u8 {
    let sum: u32 = body
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let value = CHARSET.iter().position(|c| c == b).unwrap_or(0) as u32;
            let product = value * if i % 2 == 0 { 1 } else { 2 };
            product / 36 + product % 36
        })
        .sum();
    CHARSET[((36 - sum % 36) % 36) as usize]
}

/// State code embedded in a GSTIN (first two characters)
pub fn state_code_of(tax_id: &str) -> Option<&str> {
    tax_id
        .get(..2)
        .filter(|code| code.bytes().all(|b| b.is_ascii_digit()))
}

/// Normalize a state code to its two-digit form ("7" → "07")
pub fn normalize_state_code(code: &str) -> ValidationResult<String> {
    let trimmed = code.trim();
    if trimmed.is_empty() || trimmed.len() > 2 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidStateCode(code.to_string()));
    }
    let value: u8 = trimmed
        .parse()
        .map_err(|_| ValidationError::InvalidStateCode(code.to_string()))?;
    match value {
        1..=38 | 97 | 99 => Ok(format!("{value:02}")),
        _ => Err(ValidationError::InvalidStateCode(code.to_string())),
    }
}

const STATE_NAMES: [(&str, &str); 40] = [
    ("01", "Jammu and Kashmir"),
    ("02", "Himachal Pradesh"),
    ("03", "Punjab"),
    ("04", "Chandigarh"),
    ("05", "Uttarakhand"),
    ("06", "Haryana"),
    ("07", "Delhi"),
    ("08", "Rajasthan"),
    ("09", "Uttar Pradesh"),
    ("10", "Bihar"),
    ("11", "Sikkim"),
    ("12", "Arunachal Pradesh"),
    ("13", "Nagaland"),
    ("14", "Manipur"),
    ("15", "Mizoram"),
    ("16", "Tripura"),
    ("17", "Meghalaya"),
    ("18", "Assam"),
    ("19", "West Bengal"),
    ("20", "Jharkhand"),
    ("21", "Odisha"),
    ("22", "Chhattisgarh"),
    ("23", "Madhya Pradesh"),
    ("24", "Gujarat"),
    ("25", "Daman and Diu"),
    ("26", "Dadra and Nagar Haveli and Daman and Diu"),
    ("27", "Maharashtra"),
    ("28", "Andhra Pradesh (Old)"),
    ("29", "Karnataka"),
    ("30", "Goa"),
    ("31", "Lakshadweep"),
    ("32", "Kerala"),
    ("33", "Tamil Nadu"),
    ("34", "Puducherry"),
    ("35", "Andaman and Nicobar Islands"),
    ("36", "Telangana"),
    ("37", "Andhra Pradesh"),
    ("38", "Ladakh"),
    ("97", "Other Territory"),
    ("99", "Centre Jurisdiction"),
];

/// State or territory name for a two-digit code
pub fn state_name(code: &str) -> Option<&'static str> {
    let code = normalize_state_code(code).ok()?;
    STATE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}
