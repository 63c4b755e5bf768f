//! Arrival PINs and their brute-force guard.
//!
//! A PIN is four decimal digits, so the whole space is 10,000 guesses. The
//! plaintext exists only at creation (handed once to the requester) and in
//! the operator's verification attempt; storage keeps a slow hash plus a
//! failed-attempt counter that locks verification for a while once it
//! reaches the configured limit.

use super::RequestDomainError;
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use std::fmt;

/// Number of digits in a request PIN.
pub const PIN_LENGTH: usize = 4;

/// Plaintext four-digit PIN.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestPin(String);

impl RequestPin {
    /// Draws a uniformly random PIN, leading zeros included.
    #[must_use]
    pub fn generate() -> Self {
        let value: u16 = rand::thread_rng().gen_range(0..10_000);
        Self(format!("{value:04}"))
    }

    /// Parses user input.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError::MalformedPin`] unless the trimmed input
    /// is exactly four ASCII digits.
    pub fn parse(raw: &str) -> Result<Self, RequestDomainError> {
        let trimmed = raw.trim();
        if trimmed.len() != PIN_LENGTH || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(RequestDomainError::MalformedPin);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the digits.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RequestPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestPin(****)")
    }
}

/// Stored one-way hash of a PIN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinHash(String);

impl PinHash {
    /// Wraps an encoded hash.
    #[must_use]
    pub const fn new(encoded: String) -> Self {
        Self(encoded)
    }

    /// Returns the encoded hash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Limits applied to PIN verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinPolicy {
    /// Wrong guesses allowed before verification locks.
    pub max_attempts: u32,
    /// How long verification stays locked.
    pub lockout: TimeDelta,
}

impl Default for PinPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout: TimeDelta::minutes(15),
        }
    }
}

/// Allowance left after a reserved guess, should it turn out wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinAttempt {
    /// Further guesses stay allowed.
    Granted {
        /// Wrong guesses left after this one.
        remaining: u32,
    },
    /// This guess used the last allowance; verification is already locked
    /// until the deadline unless it proves correct.
    Final {
        /// Lock deadline.
        until: DateTime<Utc>,
    },
}

/// Outcome of asking to check one guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinReservation {
    /// The guess may be checked against `hash`.
    Granted {
        /// Stored hash to check against.
        hash: PinHash,
        /// Allowance left if the guess is wrong.
        attempt: PinAttempt,
    },
    /// Verification is locked; the guess must not be checked.
    Locked {
        /// Lock deadline.
        until: DateTime<Utc>,
    },
}

/// Stored PIN state for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRecord {
    hash: PinHash,
    failed_attempts: u32,
    locked_until: Option<DateTime<Utc>>,
}

impl PinRecord {
    /// Creates a fresh record for a newly hashed PIN.
    #[must_use]
    pub const fn new(hash: PinHash) -> Self {
        Self {
            hash,
            failed_attempts: 0,
            locked_until: None,
        }
    }

    /// Reconstructs a record from storage.
    #[must_use]
    pub const fn from_persisted(
        hash: PinHash,
        failed_attempts: u32,
        locked_until: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            hash,
            failed_attempts,
            locked_until,
        }
    }

    /// Returns the stored hash.
    #[must_use]
    pub const fn hash(&self) -> &PinHash {
        &self.hash
    }

    /// Returns the attempts charged since the last success or expired lock.
    #[must_use]
    pub const fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// Returns the lock deadline, expired or not.
    #[must_use]
    pub const fn locked_until(&self) -> Option<DateTime<Utc>> {
        self.locked_until
    }

    /// Returns the deadline when verification is locked at `now`.
    #[must_use]
    pub fn lock_in_force(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.locked_until.filter(|until| *until > now)
    }

    /// Clears an expired lock together with the counter that caused it.
    ///
    /// Returns `true` when the record changed.
    pub fn release_expired_lock(&mut self, now: DateTime<Utc>) -> bool {
        match self.locked_until {
            Some(until) if until <= now => {
                self.locked_until = None;
                self.failed_attempts = 0;
                true
            }
            _ => false,
        }
    }

    /// Counts a guess before it is checked.
    ///
    /// The attempt is charged up front and the lock armed as soon as the
    /// allowance runs out, so guesses checked concurrently can never exceed
    /// `policy.max_attempts`. A correct guess clears both through
    /// [`Self::register_success`]. An expired lock is released first.
    pub fn reserve_attempt(&mut self, now: DateTime<Utc>, policy: &PinPolicy) -> PinReservation {
        self.release_expired_lock(now);
        if let Some(until) = self.lock_in_force(now) {
            return PinReservation::Locked { until };
        }
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        let attempt = if self.failed_attempts >= policy.max_attempts {
            let until = now
                .checked_add_signed(policy.lockout)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            self.locked_until = Some(until);
            PinAttempt::Final { until }
        } else {
            PinAttempt::Granted {
                remaining: policy.max_attempts.saturating_sub(self.failed_attempts),
            }
        };
        PinReservation::Granted {
            hash: self.hash.clone(),
            attempt,
        }
    }

    /// Records a correct guess.
    ///
    /// Returns `true` when the record changed.
    pub const fn register_success(&mut self) -> bool {
        let changed = self.failed_attempts != 0 || self.locked_until.is_some();
        self.failed_attempts = 0;
        self.locked_until = None;
        changed
    }
}
