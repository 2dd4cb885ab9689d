//! ISBN 驗證與正規化。
//!
//! Check digits are computed over the cleaned form (hyphens and spaces removed),
//! but [`pad`] measures the raw string. A hyphenated short input therefore stays
//! short after padding.

const CANONICAL_MIN_LEN: usize = 10;

/// Removes the separators ISBNs are commonly printed with.
pub fn clean(isbn: &str) -> String {
    isbn.chars().filter(|c| *c != '-' && *c != ' ').collect()
}

pub fn is_isbn13(cleaned: &str) -> bool {
    if cleaned.len() != 13 || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = cleaned
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 {
                digit
            } else {
                digit * 3
            }
        })
        .sum();

    sum % 10 == 0
}

pub fn is_isbn10(cleaned: &str) -> bool {
    let bytes = cleaned.as_bytes();
    if bytes.len() != 10 {
        return false;
    }

    let mut sum = 0u32;
    for (i, b) in bytes.iter().enumerate() {
        let value = match b {
            b'0'..=b'9' => u32::from(b - b'0'),
            // X 只能出現在檢查碼位置
            b'X' | b'x' if i == 9 => 10,
            _ => return false,
        };
        sum += value * (10 - i as u32);
    }

    sum % 11 == 0
}

/// True if the input passes the ISBN-13 or the ISBN-10 checksum.
pub fn validate(isbn: &str) -> bool {
    let cleaned = clean(isbn);
    is_isbn13(&cleaned) || is_isbn10(&cleaned)
}

/// Left-pads with `'0'` up to ten characters, counting the raw input.
pub fn pad(isbn: &str) -> String {
    let len = isbn.chars().count();
    if len < CANONICAL_MIN_LEN {
        format!("{}{}", "0".repeat(CANONICAL_MIN_LEN - len), isbn)
    } else {
        isbn.to_string()
    }
}

/// Uppercases and pads. The result is not validated again.
pub fn normalize(isbn: &str) -> String {
    pad(&isbn.to_uppercase())
}
