//! EGN (Bulgarian national ID) checks.
//!
//! Layout: `YY MM DD RRR C`. The month doubles as a century marker:
//! months above 40 mean the 2000s, months in 21..=40 mean the 1800s,
//! anything else the 1900s. `C` is a weighted mod-11 check digit.

use chrono::{Local, NaiveDate};
use thiserror::Error;

pub const EGN_LEN: usize = 10;

const WEIGHTS: [u32; EGN_LEN] = [2, 4, 8, 5, 10, 9, 7, 3, 6, 0];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EgnError {
    #[error("EGN must contain digits only")]
    NotNumeric,

    #[error("EGN must be 10 digits long, got {0}")]
    WrongLength(usize),

    #[error("EGN encodes an impossible birth date")]
    InvalidDate,

    #[error("EGN encodes a birth date in the future ({0})")]
    FutureDate(NaiveDate),

    #[error("EGN check digit is {found}, expected {expected}")]
    ChecksumMismatch { expected: u32, found: u32 },
}

fn digits(value: &str) -> Result<Vec<u32>, EgnError> {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EgnError::NotNumeric);
    }
    if value.len() != EGN_LEN {
        return Err(EgnError::WrongLength(value.chars().count()));
    }
    Ok(value.bytes().map(|b| u32::from(b - b'0')).collect())
}

/// Base year selected by the encoded month.
pub fn century_base(month_born: u32) -> i32 {
    if month_born > 40 {
        2000
    } else if month_born > 20 {
        1800
    } else {
        1900
    }
}

/// Decode the birth date without checking it against today or the check digit.
pub fn birth_date(value: &str) -> Result<NaiveDate, EgnError> {
    let d = digits(value)?;
    decode_date(&d)
}

fn decode_date(d: &[u32]) -> Result<NaiveDate, EgnError> {
    let month_born = d[2] * 10 + d[3];
    let year = century_base(month_born) + (d[0] * 10 + d[1]) as i32;
    let month = month_born % 20;
    let day = d[4] * 10 + d[5];
    NaiveDate::from_ymd_opt(year, month, day).ok_or(EgnError::InvalidDate)
}

/// Check digit for the first nine digits of an EGN.
pub fn checksum_digit(first_nine: &str) -> Option<u32> {
    if first_nine.len() != EGN_LEN - 1 || !first_nine.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let sum: u32 = first_nine
        .bytes()
        .zip(WEIGHTS.iter())
        .map(|(b, w)| u32::from(b - b'0') * w)
        .sum();
    Some((sum % 11) % 10)
}

/// Full check against the local current date. Returns the decoded birth date.
pub fn validate_egn(value: &str) -> Result<NaiveDate, EgnError> {
    validate_egn_on(value, Local::now().date_naive())
}

/// Boolean form of [`validate_egn`].
#[cfg(test)]
pub fn is_valid_egn(value: &str) -> bool {
    is_valid_egn_on(value, Local::now().date_naive())
}

/// Boolean form of [`validate_egn_on`].
pub fn is_valid_egn_on(value: &str, today: NaiveDate) -> bool {
    validate_egn_on(value, today).is_ok()
}

/// Full check against an explicit `today`.
pub fn validate_egn_on(value: &str, today: NaiveDate) -> Result<NaiveDate, EgnError> {
    let d = digits(value)?;
    let born = decode_date(&d)?;
    if born > today {
        return Err(EgnError::FutureDate(born));
    }

    let sum: u32 = d.iter().zip(WEIGHTS.iter()).map(|(digit, w)| digit * w).sum();
    let expected = (sum % 11) % 10;
    let found = d[EGN_LEN - 1];
    if expected != found {
        return Err(EgnError::ChecksumMismatch { expected, found });
    }

    Ok(born)
}
