//! Error types for coffer operations.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amount::Amount;
use crate::identifiers::EntityId;

/// How far a transfer got before failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferOutcome {
    /// The take failed; nothing was debited.
    TakeFailed,
    /// The give failed; the compensating refund landed.
    GiveFailedTakeReversed,
    /// The give failed and so did the compensating refund.
    GiveFailedTakeHolds,
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            TransferOutcome::TakeFailed => "not sent",
            TransferOutcome::GiveFailedTakeReversed => "sent but not received; sender refunded",
            TransferOutcome::GiveFailedTakeHolds => "sent but not received; sender not refunded",
        };
        f.write_str(message)
    }
}

/// Which transfer of a trade failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeLeg {
    /// The first amount, moving from the first participant to the second.
    First,
    /// The second amount, moving from the second participant to the first.
    Second,
}

impl fmt::Display for TradeLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TradeLeg::First => "first",
            TradeLeg::Second => "second",
        })
    }
}

/// Main error type for coffer operations.
///
/// Every variant carries the offending amount or participant reference.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SystemError {
    /// Malformed construction input.
    #[error("invalid {what}: {input:?}")]
    Validation {
        what: &'static str,
        input: String,
    },

    /// A receiver refuses an amount.
    #[error("cannot accept {amount}: {reason}")]
    Accept { amount: Amount, reason: String },

    /// A source cannot provide an amount.
    #[error("cannot supply {amount}: {reason}")]
    Supply { amount: Amount, reason: String },

    /// A settable point refuses a direct overwrite.
    #[error("cannot set {amount}: {reason}")]
    Set { amount: Amount, reason: String },

    /// A participant lacks sufficient access for an account operation.
    #[error("access denied for {participant}: {reason}")]
    AccessDenied {
        participant: EntityId,
        reason: String,
    },

    /// The participant is already on the account.
    #[error("{participant} is already an account participant")]
    DuplicateParticipant { participant: EntityId },

    /// The participant is not on the account.
    #[error("{participant} is not an account participant")]
    NotAnAccountParticipant { participant: EntityId },

    /// Removing or demoting the participant would leave the account
    /// without an owner.
    #[error("removing {participant} would leave the account without an owner")]
    LastOwner { participant: EntityId },

    /// A transfer failed.
    #[error("transfer failed: {outcome}")]
    Transfer {
        participant: EntityId,
        outcome: TransferOutcome,
        #[source]
        cause: Box<SystemError>,
    },

    /// A trade failed.
    #[error("trade failed: {leg} asset {outcome}")]
    Trade {
        participant: EntityId,
        leg: TradeLeg,
        outcome: TransferOutcome,
        #[source]
        cause: Box<SystemError>,
    },

    /// Internal engine fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SystemError {
    /// Create a transfer failure wrapping its cause.
    pub fn transfer(participant: EntityId, outcome: TransferOutcome, cause: SystemError) -> Self {
        SystemError::Transfer {
            participant,
            outcome,
            cause: Box::new(cause),
        }
    }

    /// Create a trade failure wrapping its cause.
    pub fn trade(
        participant: EntityId,
        leg: TradeLeg,
        outcome: TransferOutcome,
        cause: SystemError,
    ) -> Self {
        SystemError::Trade {
            participant,
            leg,
            outcome,
            cause: Box::new(cause),
        }
    }

    /// Get the offending amount, when the error carries one.
    pub fn amount(&self) -> Option<&Amount> {
        match self {
            SystemError::Accept { amount, .. }
            | SystemError::Supply { amount, .. }
            | SystemError::Set { amount, .. } => Some(amount),
            SystemError::Transfer { cause, .. } | SystemError::Trade { cause, .. } => {
                cause.amount()
            }
            _ => None,
        }
    }

    /// Get the offending participant, when the error carries one.
    pub fn participant(&self) -> Option<&EntityId> {
        match self {
            SystemError::AccessDenied { participant, .. }
            | SystemError::DuplicateParticipant { participant }
            | SystemError::NotAnAccountParticipant { participant }
            | SystemError::LastOwner { participant }
            | SystemError::Transfer { participant, .. }
            | SystemError::Trade { participant, .. } => Some(participant),
            _ => None,
        }
    }
}

/// Result type alias for coffer operations.
pub type Result<T> = std::result::Result<T, SystemError>;
