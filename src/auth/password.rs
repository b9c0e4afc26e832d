//! Password validation and hashing.

use zxcvbn::{Score, zxcvbn};

use crate::Error;

/// A password that has been checked against a strength estimator.
///
/// Possession of a value of this type means the password cleared the minimum
/// strength score; it says nothing about whether the password is correct for
/// any user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPassword(String);

/// The minimum zxcvbn score for a password to be accepted.
const MINIMUM_SCORE: Score = Score::Three;

impl ValidatedPassword {
    /// Validate `raw_password` with a strength estimator.
    ///
    /// # Errors
    ///
    /// Returns an [Error::TooWeak] with a human-readable suggestion if the
    /// password scores below the minimum.
    pub fn new(raw_password: &str) -> Result<Self, Error> {
        let entropy = zxcvbn(raw_password, &[]);

        if entropy.score() >= MINIMUM_SCORE {
            return Ok(Self(raw_password.to_owned()));
        }

        let suggestion = entropy
            .feedback()
            .and_then(|feedback| feedback.warning())
            .map(|warning| warning.to_string())
            .unwrap_or_else(|| "try a longer, less predictable password".to_owned());

        Err(Error::TooWeak(suggestion))
    }
}

impl AsRef<str> for ValidatedPassword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A bcrypt hash of a user's password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The default bcrypt work factor, suitable for production use.
    ///
    /// Tests should use a much lower cost (e.g. 4) to stay fast.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash a validated password with the given bcrypt `cost`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HashingError] if the underlying hashing library
    /// fails. The error string should only be logged on the server.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        bcrypt::hash(password.as_ref(), cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Validate and hash a raw password in one step.
    ///
    /// # Errors
    ///
    /// Returns an [Error::TooWeak] if the password fails validation or an
    /// [Error::HashingError] if hashing fails.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        Self::new(ValidatedPassword::new(raw_password)?, cost)
    }

    /// Wrap an existing hash string without hashing or validation.
    ///
    /// Intended for loading hashes from the database.
    pub fn new_unchecked(hash: &str) -> Self {
        Self(hash.to_owned())
    }

    /// Check `raw_password` against this hash.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidCredentials] if the password does not match,
    /// or an [Error::HashingError] if the hash could not be parsed.
    pub fn verify(&self, raw_password: &str) -> Result<(), Error> {
        match bcrypt::verify(raw_password, &self.0) {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::InvalidCredentials),
            Err(error) => Err(Error::HashingError(error.to_string())),
        }
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod password_tests {
    use crate::Error;

    use super::{PasswordHash, ValidatedPassword};

    const TEST_COST: u32 = 4;

    #[test]
    fn weak_passwords_are_rejected() {
        for raw in ["", "foo", "password", "12345678"] {
            let result = ValidatedPassword::new(raw);

            assert!(
                matches!(result, Err(Error::TooWeak(_))),
                "{raw:?} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn strong_password_is_accepted() {
        let result = ValidatedPassword::new("correct horse battery staple");

        assert!(result.is_ok());
    }

    #[test]
    fn verify_accepts_matching_password() {
        let raw = "correct horse battery staple";
        let hash = PasswordHash::from_raw_password(raw, TEST_COST).unwrap();

        assert_eq!(hash.verify(raw), Ok(()));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash =
            PasswordHash::from_raw_password("correct horse battery staple", TEST_COST).unwrap();

        assert_eq!(
            hash.verify("incorrect horse battery staple"),
            Err(Error::InvalidCredentials)
        );
    }

    #[test]
    fn hashes_are_salted() {
        let raw = "correct horse battery staple";

        let first = PasswordHash::from_raw_password(raw, TEST_COST).unwrap();
        let second = PasswordHash::from_raw_password(raw, TEST_COST).unwrap();

        assert_ne!(first, second);
    }
}
