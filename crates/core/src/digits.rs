use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Input rejected by the digital-root evaluator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DigitError {
    #[error("number is empty")]
    Empty,
    #[error("non-digit character {found:?} at position {position}")]
    NonDigit { position: usize, found: char },
}

//
// ─── DIGITAL ROOT ──────────────────────────────────────────────────────────────
//

/// Reduces a string of decimal digits to its digital root.
///
/// Digit values are summed repeatedly until a single digit remains. A
/// one-character input is returned as-is, so `"0"` evaluates to `0`.
///
/// # Examples
///
/// ```
/// # use ladders_core::digits::digital_root;
/// assert_eq!(digital_root("729")?, 9);
/// assert_eq!(digital_root("48")?, 3);
/// # Ok::<(), ladders_core::digits::DigitError>(())
/// ```
///
/// # Errors
///
/// Returns `DigitError::Empty` for an empty string and `DigitError::NonDigit`
/// for anything other than ASCII `0-9`.
pub fn digital_root(number: &str) -> Result<u8, DigitError> {
    let mut sum = 0_u64;
    let mut len = 0_usize;
    for (position, found) in number.chars().enumerate() {
        let value = found
            .to_digit(10)
            .ok_or(DigitError::NonDigit { position, found })?;
        sum += u64::from(value);
        len += 1;
    }

    if len == 0 {
        return Err(DigitError::Empty);
    }

    while sum >= 10 {
        sum = digit_sum(sum);
    }
    // sum < 10 here
    Ok(u8::try_from(sum).unwrap_or(9))
}

fn digit_sum(mut value: u64) -> u64 {
    let mut sum = 0;
    while value > 0 {
        sum += value % 10;
        value /= 10;
    }
    sum
}
