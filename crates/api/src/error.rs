// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::password_policy::PasswordPolicyError;
use marquee::CoreError;
use marquee_domain::DomainError;
use marquee_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// Who may perform the action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Access denied: '{action}' requires {required_role}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// Every variant maps to one stable `kind` string that clients can match on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor may not perform this action on this resource.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// Who may perform the action.
        required_role: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The event is not open for booking.
    EventNotBookable {
        /// A human-readable description.
        message: String,
    },
    /// Not enough tickets remain in the tier.
    InsufficientInventory {
        /// Tickets requested.
        requested: u32,
        /// Tickets still available.
        available: u32,
        /// A human-readable description.
        message: String,
    },
    /// The booking is not in a state that allows cancellation.
    NotCancellable {
        /// A human-readable description.
        message: String,
    },
    /// The cancellation deadline has passed.
    DeadlinePassed {
        /// A human-readable description.
        message: String,
    },
    /// A status change is not allowed from the current state.
    InvalidTransition {
        /// A human-readable description.
        message: String,
    },
    /// The proof-of-purchase could not be produced.
    EncodingFailure {
        /// A description of the failure.
        message: String,
    },
    /// The store could not complete the operation.
    StoreUnavailable {
        /// A description of the failure.
        message: String,
    },
    /// Password policy violation.
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
}

impl ApiError {
    /// Stable machine-readable error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed { .. } => "authentication_failed",
            Self::Unauthorized { .. } => "access_denied",
            Self::InvalidInput { .. } | Self::PasswordPolicyViolation { .. } => "invalid_input",
            Self::ResourceNotFound { .. } => "not_found",
            Self::EventNotBookable { .. } => "event_not_bookable",
            Self::InsufficientInventory { .. } => "insufficient_inventory",
            Self::NotCancellable { .. } => "not_cancellable",
            Self::DeadlinePassed { .. } => "deadline_passed",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::EncodingFailure { .. } => "encoding_failure",
            Self::StoreUnavailable { .. } => "store_unavailable",
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Access denied: '{action}' requires {required_role}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::EventNotBookable { message }
            | Self::InsufficientInventory { message, .. }
            | Self::NotCancellable { message }
            | Self::DeadlinePassed { message }
            | Self::InvalidTransition { message } => f.write_str(message),
            Self::EncodingFailure { message } => {
                write!(f, "Proof-of-purchase encoding failed: {message}")
            }
            Self::StoreUnavailable { message } => {
                write!(f, "Store unavailable: {message}")
            }
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    let invalid = |field: &str| ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    };
    match &err {
        DomainError::InvalidCustomerDetails { field, .. }
        | DomainError::InvalidEvent { field, .. } => invalid(field),
        DomainError::InvalidQuantity(_) | DomainError::PriceOverflow { .. } => invalid("quantity"),
        DomainError::InvalidTier { .. } | DomainError::DuplicateTier(_) => invalid("tiers"),
        DomainError::InvalidTierLabel(_) => invalid("tierLabel"),
        DomainError::InvalidEventStatus(_) | DomainError::InvalidBookingStatus(_) => {
            invalid("status")
        }
        DomainError::InvalidEventCategory(_) => invalid("category"),
        DomainError::InvalidPaymentStatus(_) => invalid("paymentStatus"),
        DomainError::InvalidBookingId(_) => invalid("bookingId"),
        DomainError::DateArithmeticOverflow { .. } => invalid("date"),
        DomainError::InsufficientOfflineTickets { .. } => invalid("delta"),
        DomainError::EventNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Event"),
            message,
        },
        DomainError::TierNotFound { .. } => ApiError::ResourceNotFound {
            resource_type: String::from("Ticket tier"),
            message,
        },
        DomainError::BookingNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Booking"),
            message,
        },
        DomainError::EventNotBookable { .. } => ApiError::EventNotBookable { message },
        DomainError::InsufficientInventory {
            requested,
            available,
            ..
        } => ApiError::InsufficientInventory {
            requested: *requested,
            available: *available,
            message,
        },
        DomainError::BookingNotCancellable { .. } => ApiError::NotCancellable { message },
        DomainError::CancellationDeadlinePassed { .. } => ApiError::DeadlinePassed { message },
        DomainError::InvalidStatusTransition { .. } => ApiError::InvalidTransition { message },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::EncodingFailure(message) => ApiError::EncodingFailure { message },
    }
}

/// Translates a persistence error into an API error.
///
/// Rule rejections keep their meaning; anything the store could not do
/// becomes `StoreUnavailable`.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::Domain(domain_err) => translate_domain_error(domain_err),
        PersistenceError::DuplicateBookingId(id) => ApiError::InvalidInput {
            field: String::from("bookingId"),
            message: format!("Booking {id} already exists"),
        },
        PersistenceError::DuplicateLoginName(login) => ApiError::InvalidInput {
            field: String::from("email"),
            message: format!("An account with email '{login}' already exists"),
        },
        PersistenceError::OutOfRange(msg) => ApiError::InvalidInput {
            field: String::from("value"),
            message: msg,
        },
        err @ PersistenceError::BookingStateConflict { .. } => ApiError::InvalidTransition {
            message: err.to_string(),
        },
        PersistenceError::NotFound(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message: msg,
        },
        err => ApiError::StoreUnavailable {
            message: err.to_string(),
        },
    }
}
