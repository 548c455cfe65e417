use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::digits::{DigitError, digital_root};

/// Shortest generated number.
pub const MIN_NUMBER_LEN: usize = 3;
/// Longest generated number.
pub const MAX_NUMBER_LEN: usize = 5;

/// Produces a random number for one round.
///
/// The length is uniform over `MIN_NUMBER_LEN..=MAX_NUMBER_LEN` and every digit
/// is uniform over `1..=9`, so the string never contains `'0'`.
#[must_use]
pub fn generate_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.random_range(MIN_NUMBER_LEN..=MAX_NUMBER_LEN);
    (0..len)
        .map(|_| char::from(b'0' + rng.random_range(1..=9_u8)))
        .collect()
}

//
// ─── ROUND NUMBER ──────────────────────────────────────────────────────────────
//

/// A validated round number together with its digital root.
///
/// Holding a `RoundNumber` means the correct answer is already known, so the
/// session never evaluates an empty or malformed string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoundNumber {
    digits: String,
    root: u8,
}

impl RoundNumber {
    /// Validate an arbitrary digit string.
    ///
    /// Any non-empty ASCII digit string is accepted, zeros and length included;
    /// only generated numbers are guaranteed to be 3-5 digits from `1..=9`.
    ///
    /// # Errors
    ///
    /// Returns `DigitError` if the string is empty or contains a non-digit.
    pub fn parse(digits: impl Into<String>) -> Result<Self, DigitError> {
        let digits = digits.into();
        let root = digital_root(&digits)?;
        Ok(Self { digits, root })
    }

    /// Draw a fresh number from `rng`.
    #[must_use]
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let digits = generate_number(rng);
        // generated digits are always 1-9, and the string is never empty
        let root = digital_root(&digits).unwrap_or(9);
        Self { digits, root }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// The correct answer for this number.
    #[must_use]
    pub fn root(&self) -> u8 {
        self.root
    }
}

impl fmt::Display for RoundNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits)
    }
}

impl TryFrom<String> for RoundNumber {
    type Error = DigitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<RoundNumber> for String {
    fn from(value: RoundNumber) -> Self {
        value.digits
    }
}

//
// ─── SOURCES ───────────────────────────────────────────────────────────────────
//

/// Supplies the number for each new round.
pub trait NumberSource: Send {
    fn next_number(&mut self) -> RoundNumber;
}

/// Random numbers from any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomNumbers<R = ChaCha8Rng> {
    rng: R,
}

impl RandomNumbers<ChaCha8Rng> {
    /// Deterministic sequence for tests and replays.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seeded once from the thread-local generator.
    #[must_use]
    pub fn from_thread_rng() -> Self {
        Self {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }
}

impl<R: Rng> RandomNumbers<R> {
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> NumberSource for RandomNumbers<R> {
    fn next_number(&mut self) -> RoundNumber {
        RoundNumber::generate(&mut self.rng)
    }
}

/// Replays a fixed list of numbers, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedNumbers {
    numbers: Vec<RoundNumber>,
    next: usize,
}

impl ScriptedNumbers {
    /// # Errors
    ///
    /// Returns `DigitError` for the first entry that is not a digit string, or
    /// `DigitError::Empty` when the list itself is empty.
    pub fn new<I, S>(numbers: I) -> Result<Self, DigitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let numbers = numbers
            .into_iter()
            .map(RoundNumber::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if numbers.is_empty() {
            return Err(DigitError::Empty);
        }
        Ok(Self { numbers, next: 0 })
    }
}

impl NumberSource for ScriptedNumbers {
    fn next_number(&mut self) -> RoundNumber {
        let number = self.numbers[self.next % self.numbers.len()].clone();
        self.next = self.next.wrapping_add(1);
        number
    }
}
