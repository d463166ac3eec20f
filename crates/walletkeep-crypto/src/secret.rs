//! Scoped password handle.
//!
//! A [`Password`] owns the user's password for exactly as long as one
//! save or export call needs it. The buffer is zeroized on drop, so
//! every exit path of the consuming call (success, rejection, cipher
//! failure) scrubs it.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// User-supplied password, zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Password(String);

// Password does not implement Clone/Debug to prevent leakage.

impl Password {
    /// Takes ownership of `password`.
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Returns the password bytes for key derivation.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Returns `true` if the password is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Password {
    fn from(password: String) -> Self {
        Self(password)
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Self {
        Self(password.to_owned())
    }
}
