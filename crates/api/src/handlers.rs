// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions: the booking workflow, the event catalog and
//! account management.
//!
//! Handlers take the persistence handle explicitly along with the current
//! instant, so every time-dependent rule is evaluated against the `now`
//! passed in by the caller.

use num_traits::ToPrimitive;
use std::collections::BTreeSet;
use std::str::FromStr;
use time::{Duration, OffsetDateTime};
use tracing::{debug, error, info, warn};

use marquee::{
    BookingRequest, BookingTransition, Command, HistoryEntry, apply, generate_booking_id,
    plan_booking, verify_proof as verify_proof_payload,
};
use marquee_domain::{
    Booking, BookingId, BookingStatus, DomainError, Event, EventCategory, EventStatus, NewEvent,
    PaymentStatus, ReservationToken, TicketTier, TierLabel, TierLevels, validate_customer_details,
    validate_new_event, validate_quantity,
};
use marquee_persistence::{
    AccountData, AccountFilter, AccountPage, BookingFilter, BookingPage, Persistence,
    PersistenceError,
};

use crate::auth::{
    AuthenticatedActor, AuthenticationService, AuthorizationService, LoginSession, Role,
};
use crate::error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    AccountDetailsResponse, AccountInfo, AccountStatsResponse, AdjustTierRequest,
    BookingHistoryInfo, BookingHistoryResponse, BookingInfo, BookingStatsResponse,
    ChangeRoleRequest, CompletePaymentRequest, CreateBookingRequest, CreateEventRequest,
    DashboardResponse, DashboardStats, DeleteAccountResponse, EventInfo, ListAccountsQuery,
    ListAccountsResponse, ListBookingsQuery, ListBookingsResponse, ListEventsResponse, LoginRequest,
    LoginResponse, MyBookingsResponse, RegisterRequest, SetTierPriceRequest, TierInput,
    TierLevelsResponse, UpdateBookingStatusRequest, UpdateEventStatusRequest, VerifyProofRequest,
    VerifyProofResponse, format_instant, parse_instant,
};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a caller may ask for.
pub const MAX_PAGE_SIZE: u32 = 100;

/// How many times a guarded booking update is retried after losing a race.
const MAX_TRANSITION_ATTEMPTS: usize = 3;

/// Number of bookings shown on the dashboard.
pub const DASHBOARD_RECENT_BOOKINGS: usize = 5;

/// Accounts created within this window count as new.
const NEW_ACCOUNT_WINDOW: Duration = Duration::days(30);

// ========================================================================
// Booking workflow
// ========================================================================

/// Books tickets for the requesting account.
///
/// Reserves inventory first and then records the booking. If anything fails
/// after the reservation succeeded, the tickets are released again before the
/// error is returned.
///
/// When the request carries a booking id that already exists for the same
/// account, the stored booking is returned and nothing is reserved.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `request` - The booking request
/// * `actor` - The authenticated account making the booking
/// * `now` - The current instant
///
/// # Errors
///
/// Returns an error if:
/// - The tier label, quantity, customer details or booking id are invalid
/// - The event or tier does not exist
/// - The event is not open for booking
/// - Not enough tickets remain
/// - The proof-of-purchase cannot be produced or the booking cannot be stored
pub fn create_booking(
    persistence: &mut Persistence,
    request: CreateBookingRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<BookingInfo, ApiError> {
    let tier: TierLabel =
        TierLabel::from_str(&request.tier_label).map_err(translate_domain_error)?;
    validate_customer_details(&request.customer_details).map_err(translate_domain_error)?;
    validate_quantity(request.quantity).map_err(translate_domain_error)?;

    let intended_id: Option<BookingId> = request
        .booking_id
        .as_deref()
        .map(BookingId::new)
        .transpose()
        .map_err(translate_domain_error)?;

    if let Some(booking_id) = &intended_id {
        let existing: Option<Booking> = persistence
            .get_booking(booking_id.as_str())
            .map_err(translate_persistence_error)?;
        if let Some(existing) = existing {
            if !existing.is_owned_by(actor.account_id) {
                return Err(ApiError::InvalidInput {
                    field: String::from("bookingId"),
                    message: format!("Booking {booking_id} already exists"),
                });
            }
            info!(booking_id = %booking_id, "Returning previously created booking");
            return BookingInfo::from_booking(&existing, now);
        }
    }

    let token: ReservationToken = persistence
        .reserve(request.event_id, tier, request.quantity, now)
        .map_err(translate_persistence_error)?;
    debug!(
        event_id = token.event_id,
        tier = %token.tier,
        quantity = token.quantity,
        unit_price = token.unit_price,
        "Tickets reserved"
    );

    let stored: Result<Booking, ApiError> = intended_id
        .map_or_else(
            || generate_booking_id(now).map_err(translate_core_error),
            Ok,
        )
        .and_then(|booking_id| {
            store_reserved_booking(
                persistence,
                &token,
                BookingRequest {
                    booking_id,
                    account_id: actor.account_id,
                    customer: request.customer_details,
                },
                now,
            )
        });

    match stored {
        Ok(booking) => {
            info!(
                booking_id = %booking.booking_id,
                event_id = booking.event_id,
                account_id = booking.account_id,
                tier = %booking.tier,
                quantity = booking.quantity,
                total_price = booking.total_price,
                "Booking created"
            );
            BookingInfo::from_booking(&booking, now)
        }
        Err(err) => {
            release_reservation(persistence, &token, actor.account_id, &err);
            Err(err)
        }
    }
}

/// Plans and stores a booking for tickets that are already reserved.
fn store_reserved_booking(
    persistence: &mut Persistence,
    token: &ReservationToken,
    request: BookingRequest,
    now: OffsetDateTime,
) -> Result<Booking, ApiError> {
    let transition: BookingTransition =
        plan_booking(token, request, now).map_err(translate_core_error)?;
    persistence
        .insert_booking(&transition)
        .map_err(translate_persistence_error)?;
    Ok(transition.new_booking)
}

/// Gives reserved tickets back after the booking could not be completed.
fn release_reservation(
    persistence: &mut Persistence,
    token: &ReservationToken,
    account_id: i64,
    cause: &ApiError,
) {
    if let ApiError::EncodingFailure { message } = cause {
        error!(
            event_id = token.event_id,
            account_id,
            error = %message,
            "Proof-of-purchase encoding failed"
        );
    }
    warn!(
        event_id = token.event_id,
        tier = %token.tier,
        quantity = token.quantity,
        account_id,
        error = %cause,
        "Booking failed after reservation, releasing tickets"
    );
    if let Err(release_err) = persistence.release(token.event_id, token.tier, token.quantity) {
        error!(
            event_id = token.event_id,
            tier = %token.tier,
            quantity = token.quantity,
            account_id,
            booking_error = %cause,
            release_error = %release_err,
            "Compensating release failed; tickets remain reserved"
        );
    }
}

/// Cancels a booking and returns its tickets to the tier.
///
/// The status flip is guarded on the booking still being confirmed, so a
/// booking is released at most once. If the release fails, the status flip
/// is reverted.
///
/// # Errors
///
/// Returns an error if:
/// - The booking does not exist
/// - The actor is neither the owner nor an Admin
/// - The booking is not confirmed
/// - The cancellation deadline has passed
/// - The store fails
pub fn cancel_booking(
    persistence: &mut Persistence,
    booking_id: &str,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<BookingInfo, ApiError> {
    let (before, transition): (Booking, BookingTransition) = run_booking_command(
        persistence,
        booking_id,
        Command::Cancel,
        actor,
        now,
        |actor, booking| {
            AuthorizationService::authorize_booking_access(actor, booking, "cancel_booking")
        },
    )?;

    let cancelled: &Booking = &transition.new_booking;
    match persistence.release(cancelled.event_id, cancelled.tier, cancelled.quantity) {
        Ok(levels) => {
            info!(
                booking_id = %cancelled.booking_id,
                event_id = cancelled.event_id,
                tier = %cancelled.tier,
                quantity = cancelled.quantity,
                available = levels.available(),
                "Booking cancelled"
            );
            BookingInfo::from_booking(cancelled, now)
        }
        Err(release_err) => {
            revert_cancellation(persistence, &before, cancelled, actor.account_id);
            Err(translate_persistence_error(release_err))
        }
    }
}

/// Restores a cancelled booking to its previous state after the release
/// failed.
fn revert_cancellation(
    persistence: &mut Persistence,
    before: &Booking,
    cancelled: &Booking,
    actor_account_id: i64,
) {
    let mut restored: Booking = before.clone();
    restored.updated_at = cancelled.updated_at;
    let revert: BookingTransition = BookingTransition {
        history: HistoryEntry {
            booking_id: before.booking_id.clone(),
            previous_status: Some(BookingStatus::Cancelled),
            new_status: before.booking_status,
            payment_status: before.payment_status,
            actor_account_id: Some(actor_account_id),
            action: String::from("RevertCancel"),
            recorded_at: cancelled.updated_at,
        },
        new_booking: restored,
    };

    match persistence.transition_booking(&revert, BookingStatus::Cancelled, PaymentStatus::Refunded)
    {
        Ok(()) => warn!(
            booking_id = %before.booking_id,
            "Ticket release failed, cancellation reverted"
        ),
        Err(err) => error!(
            booking_id = %before.booking_id,
            event_id = before.event_id,
            tier = %before.tier,
            quantity = before.quantity,
            error = %err,
            "Ticket release failed and the cancellation could not be reverted"
        ),
    }
}

/// Settles the simulated payment of a booking.
///
/// # Errors
///
/// Returns an error if the booking does not exist, the actor is neither the
/// owner nor an Admin, or the payment is not pending.
pub fn complete_payment(
    persistence: &mut Persistence,
    booking_id: &str,
    request: CompletePaymentRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<BookingInfo, ApiError> {
    let (_, transition): (Booking, BookingTransition) = run_booking_command(
        persistence,
        booking_id,
        Command::SettlePayment {
            succeeded: request.succeeded,
        },
        actor,
        now,
        |actor, booking| {
            AuthorizationService::authorize_booking_access(actor, booking, "complete_payment")
        },
    )?;

    info!(
        booking_id = %transition.new_booking.booking_id,
        payment_status = %transition.new_booking.payment_status,
        "Payment settled"
    );
    BookingInfo::from_booking(&transition.new_booking, now)
}

/// Marks a confirmed booking as attended.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the booking does not
/// exist, or the booking is not confirmed.
pub fn check_in(
    persistence: &mut Persistence,
    booking_id: &str,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<BookingInfo, ApiError> {
    AuthorizationService::authorize_check_in(actor)?;

    let (_, transition): (Booking, BookingTransition) = run_booking_command(
        persistence,
        booking_id,
        Command::CheckIn,
        actor,
        now,
        |_, _| Ok(()),
    )?;

    info!(booking_id = %transition.new_booking.booking_id, "Booking checked in");
    BookingInfo::from_booking(&transition.new_booking, now)
}

/// Loads a booking, applies a command and stores the result with a guarded
/// update, retrying when the booking changed in between.
///
/// Returns the booking as loaded and the stored transition.
fn run_booking_command(
    persistence: &mut Persistence,
    booking_id: &str,
    command: Command,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
    authorize: impl Fn(&AuthenticatedActor, &Booking) -> Result<(), AuthError>,
) -> Result<(Booking, BookingTransition), ApiError> {
    for attempt in 1..=MAX_TRANSITION_ATTEMPTS {
        let booking: Booking = load_booking(persistence, booking_id)?;
        authorize(actor, &booking)?;

        let transition: BookingTransition =
            apply(&booking, command, actor.account_id, now).map_err(translate_core_error)?;

        match persistence.transition_booking(
            &transition,
            booking.booking_status,
            booking.payment_status,
        ) {
            Ok(()) => return Ok((booking, transition)),
            Err(PersistenceError::BookingStateConflict { .. }) => {
                debug!(
                    booking_id,
                    attempt,
                    action = command.action_name(),
                    "Booking changed concurrently"
                );
            }
            Err(err) => return Err(translate_persistence_error(err)),
        }
    }

    Err(ApiError::InvalidTransition {
        message: format!("Booking {booking_id} kept changing while being updated; try again"),
    })
}

fn load_booking(persistence: &mut Persistence, booking_id: &str) -> Result<Booking, ApiError> {
    persistence
        .get_booking(booking_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::BookingNotFound(booking_id.to_string())))
}

/// Retrieves one booking.
///
/// # Errors
///
/// Returns an error if the booking does not exist or the actor is neither
/// the owner nor an Admin.
pub fn get_booking(
    persistence: &mut Persistence,
    booking_id: &str,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<BookingInfo, ApiError> {
    let booking: Booking = load_booking(persistence, booking_id)?;
    AuthorizationService::authorize_booking_access(actor, &booking, "get_booking")?;
    BookingInfo::from_booking(&booking, now)
}

/// Retrieves the status history of one booking.
///
/// # Errors
///
/// Returns an error if the booking does not exist or the actor is neither
/// the owner nor an Admin.
pub fn get_booking_history(
    persistence: &mut Persistence,
    booking_id: &str,
    actor: &AuthenticatedActor,
) -> Result<BookingHistoryResponse, ApiError> {
    let booking: Booking = load_booking(persistence, booking_id)?;
    AuthorizationService::authorize_booking_access(actor, &booking, "get_booking_history")?;

    let entries: Vec<BookingHistoryInfo> = persistence
        .get_booking_history(booking_id)
        .map_err(translate_persistence_error)?
        .iter()
        .map(BookingHistoryInfo::from_entry)
        .collect::<Result<_, _>>()?;

    Ok(BookingHistoryResponse {
        booking_id: booking.booking_id.to_string(),
        entries,
    })
}

/// Lists the actor's own bookings, newest first.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn list_my_bookings(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<MyBookingsResponse, ApiError> {
    let bookings: Vec<BookingInfo> = persistence
        .list_bookings_for_account(actor.account_id)
        .map_err(translate_persistence_error)?
        .iter()
        .map(|booking| BookingInfo::from_booking(booking, now))
        .collect::<Result<_, _>>()?;
    Ok(MyBookingsResponse { bookings })
}

/// Lists one page of all bookings.
///
/// Only Admin actors may list every booking.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The status filter, page or limit is invalid
/// - The store fails
pub fn list_bookings(
    persistence: &mut Persistence,
    query: &ListBookingsQuery,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<ListBookingsResponse, ApiError> {
    AuthorizationService::authorize_view_all_bookings(actor)?;

    let status: Option<BookingStatus> = query
        .status
        .as_deref()
        .map(BookingStatus::from_str)
        .transpose()
        .map_err(translate_domain_error)?;

    let (page, limit): (u32, u32) = page_bounds(query.page, query.limit)?;

    let filter: BookingFilter = BookingFilter {
        status,
        event_id: query.event_id,
    };
    let result: BookingPage = persistence
        .list_bookings(filter, page, limit)
        .map_err(translate_persistence_error)?;

    let bookings: Vec<BookingInfo> = result
        .bookings
        .iter()
        .map(|booking| BookingInfo::from_booking(booking, now))
        .collect::<Result<_, _>>()?;

    Ok(ListBookingsResponse {
        bookings,
        total: result.total,
        total_pages: result.total.div_ceil(u64::from(limit)),
        current_page: page,
        limit,
    })
}

/// Applies the paging defaults and checks the requested page.
fn page_bounds(page: Option<u32>, limit: Option<u32>) -> Result<(u32, u32), ApiError> {
    let page: u32 = page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::InvalidInput {
            field: String::from("page"),
            message: String::from("must be at least 1"),
        });
    }
    let limit: u32 = limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if limit == 0 || limit > MAX_PAGE_SIZE {
        return Err(ApiError::InvalidInput {
            field: String::from("limit"),
            message: format!("must be between 1 and {MAX_PAGE_SIZE}"),
        });
    }
    Ok((page, limit))
}

/// Moves a booking to the requested status on behalf of an administrator.
///
/// There is no direct status write: `cancelled` runs the cancellation
/// (tickets go back to the tier and the payment is refunded), `attended`
/// checks the booking in, and a payment status of `completed` or `failed`
/// settles a pending payment. Every state machine rule still applies.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - Neither status is given, or a status is unknown
/// - The requested status cannot be reached by a booking command
/// - The booking does not exist or the command is rejected
pub fn update_booking_status(
    persistence: &mut Persistence,
    booking_id: &str,
    request: &UpdateBookingStatusRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<BookingInfo, ApiError> {
    AuthorizationService::authorize_update_booking_status(actor)?;

    let booking_status: Option<BookingStatus> = request
        .booking_status
        .as_deref()
        .map(BookingStatus::from_str)
        .transpose()
        .map_err(translate_domain_error)?;
    let payment_status: Option<PaymentStatus> = request
        .payment_status
        .as_deref()
        .map(PaymentStatus::from_str)
        .transpose()
        .map_err(translate_domain_error)?;

    match (booking_status, payment_status) {
        (Some(BookingStatus::Cancelled), None | Some(PaymentStatus::Refunded)) => {
            cancel_booking(persistence, booking_id, actor, now)
        }
        (Some(BookingStatus::Attended), None) => check_in(persistence, booking_id, actor, now),
        (None, Some(PaymentStatus::Completed)) => complete_payment(
            persistence,
            booking_id,
            CompletePaymentRequest { succeeded: true },
            actor,
            now,
        ),
        (None, Some(PaymentStatus::Failed)) => complete_payment(
            persistence,
            booking_id,
            CompletePaymentRequest { succeeded: false },
            actor,
            now,
        ),
        (None, None) => Err(ApiError::InvalidInput {
            field: String::from("bookingStatus"),
            message: String::from("bookingStatus or paymentStatus is required"),
        }),
        (booking_status, payment_status) => Err(ApiError::InvalidTransition {
            message: format!(
                "Booking {booking_id} cannot be moved to booking status '{}' and payment \
                 status '{}'",
                booking_status.map_or("unchanged", |status| status.as_str()),
                payment_status.map_or("unchanged", |status| status.as_str())
            ),
        }),
    }
}

/// Returns booking totals and revenue from completed payments.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the store fails.
pub fn booking_stats(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<BookingStatsResponse, ApiError> {
    AuthorizationService::authorize_view_all_bookings(actor)?;
    persistence
        .booking_stats()
        .map(BookingStatsResponse::from)
        .map_err(translate_persistence_error)
}

/// Checks a presented proof-of-purchase against the stored booking.
///
/// # Errors
///
/// Returns an error if the booking does not exist or the store fails.
pub fn verify_proof(
    persistence: &mut Persistence,
    booking_id: &str,
    request: &VerifyProofRequest,
) -> Result<VerifyProofResponse, ApiError> {
    let booking: Booking = load_booking(persistence, booking_id)?;
    let valid: bool =
        verify_proof_payload(&booking, &request.payload).map_err(translate_core_error)?;
    if !valid {
        warn!(booking_id, "Presented proof-of-purchase does not match");
    }
    Ok(VerifyProofResponse {
        booking_id: booking.booking_id.to_string(),
        valid,
        booking_status: booking.booking_status.as_str().to_string(),
    })
}

// ========================================================================
// Event catalog
// ========================================================================

/// Creates an event with its ticket tiers.
///
/// Only Admin actors may create events.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the definition is invalid,
/// or the store fails.
pub fn create_event(
    persistence: &mut Persistence,
    request: CreateEventRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<EventInfo, ApiError> {
    AuthorizationService::authorize_manage_events(actor, "create_event")?;

    let new_event: NewEvent = build_new_event(request)?;
    validate_new_event(&new_event, now).map_err(translate_domain_error)?;

    let event_id: i64 = persistence
        .create_event(&new_event, now)
        .map_err(translate_persistence_error)?;
    info!(event_id, title = %new_event.title, tiers = new_event.tiers.len(), "Event created");

    EventInfo::from_event(&load_event(persistence, event_id)?)
}

fn build_new_event(request: CreateEventRequest) -> Result<NewEvent, ApiError> {
    let tiers: Vec<TicketTier> = request
        .tiers
        .into_iter()
        .map(build_tier)
        .collect::<Result<_, _>>()?;
    Ok(NewEvent {
        starts_at: parse_instant("date", &request.date)?,
        category: EventCategory::from_str(&request.category).map_err(translate_domain_error)?,
        title: request.title,
        description: request.description,
        venue: request.venue,
        artists: request.artists,
        tiers,
        featured: request.featured,
        duration: request.duration,
    })
}

fn build_tier(input: TierInput) -> Result<TicketTier, ApiError> {
    let label: TierLabel =
        TierLabel::from_str(&input.tier_label).map_err(translate_domain_error)?;
    TicketTier::with_sold(label, input.price, input.total, input.sold)
        .map(|tier| tier.with_features(input.features))
        .map_err(translate_domain_error)
}

fn load_event(persistence: &mut Persistence, event_id: i64) -> Result<Event, ApiError> {
    persistence
        .get_event(event_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::EventNotFound(event_id)))
}

/// Lists upcoming events, soonest first.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn list_upcoming_events(persistence: &mut Persistence) -> Result<ListEventsResponse, ApiError> {
    let events: Vec<Event> = persistence
        .list_upcoming_events()
        .map_err(translate_persistence_error)?;
    to_event_list(&events)
}

/// Lists featured upcoming events, soonest first.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn list_featured_events(persistence: &mut Persistence) -> Result<ListEventsResponse, ApiError> {
    let events: Vec<Event> = persistence
        .list_featured_events()
        .map_err(translate_persistence_error)?;
    to_event_list(&events)
}

fn to_event_list(events: &[Event]) -> Result<ListEventsResponse, ApiError> {
    Ok(ListEventsResponse {
        events: events
            .iter()
            .map(EventInfo::from_event)
            .collect::<Result<_, _>>()?,
    })
}

/// Retrieves one event with its tiers and derived totals.
///
/// # Errors
///
/// Returns an error if the event does not exist or the store fails.
pub fn get_event(persistence: &mut Persistence, event_id: i64) -> Result<EventInfo, ApiError> {
    EventInfo::from_event(&load_event(persistence, event_id)?)
}

/// Moves an event to a new status.
///
/// Valid moves are `upcoming -> ongoing -> completed` and any non-terminal
/// status to `cancelled`. Existing bookings are left untouched.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The status is unknown or the move is not allowed
/// - The event does not exist
/// - The store fails
pub fn update_event_status(
    persistence: &mut Persistence,
    event_id: i64,
    request: &UpdateEventStatusRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<EventInfo, ApiError> {
    AuthorizationService::authorize_manage_events(actor, "update_event_status")?;
    let target: EventStatus =
        EventStatus::from_str(&request.status).map_err(translate_domain_error)?;
    change_event_status(persistence, event_id, target, now)
}

/// Cancels an event. Existing bookings keep their own event snapshot.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the event does not exist
/// or is already completed or cancelled, or the store fails.
pub fn cancel_event(
    persistence: &mut Persistence,
    event_id: i64,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<EventInfo, ApiError> {
    AuthorizationService::authorize_manage_events(actor, "cancel_event")?;
    change_event_status(persistence, event_id, EventStatus::Cancelled, now)
}

fn change_event_status(
    persistence: &mut Persistence,
    event_id: i64,
    target: EventStatus,
    now: OffsetDateTime,
) -> Result<EventInfo, ApiError> {
    let event: Event = load_event(persistence, event_id)?;
    if !event.status.can_transition_to(target) {
        return Err(ApiError::InvalidTransition {
            message: format!(
                "Cannot move event {event_id} from '{}' to '{target}'",
                event.status
            ),
        });
    }

    let updated: bool = persistence
        .update_event_status(event_id, event.status, target, now)
        .map_err(translate_persistence_error)?;
    if !updated {
        return Err(ApiError::InvalidTransition {
            message: format!("Event {event_id} changed status concurrently; try again"),
        });
    }

    info!(event_id, from = %event.status, to = %target, "Event status changed");
    EventInfo::from_event(&load_event(persistence, event_id)?)
}

/// Adjusts a tier's sold count by a signed delta.
///
/// A positive delta takes tickets offline and fails when not enough remain.
/// A negative delta puts offline tickets back on sale; booked tickets are
/// only freed by cancelling their booking.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The tier label is unknown, or the delta is zero or out of range
/// - The event or tier does not exist
/// - Not enough tickets remain, or fewer than `-delta` are held offline
pub fn adjust_tier(
    persistence: &mut Persistence,
    event_id: i64,
    request: &AdjustTierRequest,
    actor: &AuthenticatedActor,
) -> Result<TierLevelsResponse, ApiError> {
    AuthorizationService::authorize_manage_events(actor, "adjust_tier")?;
    let tier: TierLabel =
        TierLabel::from_str(&request.tier_label).map_err(translate_domain_error)?;
    let delta: i32 = request
        .delta
        .to_i32()
        .ok_or_else(|| ApiError::InvalidInput {
            field: String::from("delta"),
            message: format!("{} is out of range", request.delta),
        })?;

    let levels: TierLevels = persistence
        .adjust_tier(event_id, tier, delta)
        .map_err(translate_persistence_error)?;
    info!(
        event_id,
        tier = %tier,
        delta,
        sold = levels.sold,
        offline = levels.offline,
        available = levels.available(),
        "Tier adjusted"
    );
    Ok(TierLevelsResponse::new(event_id, &levels))
}

/// Sets a tier's current price. Existing bookings keep their price.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the tier label is unknown,
/// the event or tier does not exist, or the price cannot be stored.
pub fn set_tier_price(
    persistence: &mut Persistence,
    event_id: i64,
    request: &SetTierPriceRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<TierLevelsResponse, ApiError> {
    AuthorizationService::authorize_manage_events(actor, "set_tier_price")?;
    let tier: TierLabel =
        TierLabel::from_str(&request.tier_label).map_err(translate_domain_error)?;

    let levels: TierLevels = persistence
        .set_tier_price(event_id, tier, request.price, now)
        .map_err(translate_persistence_error)?;
    info!(event_id, tier = %tier, price = levels.price, "Tier price changed");
    Ok(TierLevelsResponse::new(event_id, &levels))
}

// ========================================================================
// Accounts and sessions
// ========================================================================

/// Registers a customer account.
///
/// # Errors
///
/// Returns an error if:
/// - The email or display name is invalid
/// - The password does not meet the policy
/// - An account with this email already exists
pub fn register(
    persistence: &mut Persistence,
    request: &RegisterRequest,
    now: OffsetDateTime,
) -> Result<AccountInfo, ApiError> {
    let account: AccountData = create_account(
        persistence,
        &request.email,
        &request.display_name,
        &request.password,
        Role::Customer,
        now,
    )?;
    info!(account_id = account.account_id, "Customer registered");
    Ok(AccountInfo::from(&account))
}

fn create_account(
    persistence: &mut Persistence,
    email: &str,
    display_name: &str,
    password: &str,
    role: Role,
    now: OffsetDateTime,
) -> Result<AccountData, ApiError> {
    let email: &str = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::InvalidInput {
            field: String::from("email"),
            message: format!("'{email}' is not an email address"),
        });
    }
    if display_name.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("displayName"),
            message: String::from("cannot be empty"),
        });
    }
    PasswordPolicy::default().validate(password, email)?;

    let account_id: i64 = persistence
        .create_account(email, display_name.trim(), password, role.as_str(), now)
        .map_err(translate_persistence_error)?;
    persistence
        .get_account_by_id(account_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::StoreUnavailable {
            message: format!("Account {account_id} not found after creation"),
        })
}

/// Logs in and opens a session.
///
/// # Errors
///
/// Returns an error if the credentials are wrong or the session cannot be
/// stored.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
    now: OffsetDateTime,
) -> Result<LoginResponse, ApiError> {
    let session: LoginSession =
        AuthenticationService::login(persistence, &request.email, &request.password, now)?;
    Ok(LoginResponse {
        expires_at: format_instant("expiresAt", session.expires_at)?,
        account: AccountInfo::from(&session.account),
        session_token: session.session_token,
    })
}

/// Logs out by deleting the session.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Returns the account behind the current session.
#[must_use]
pub fn whoami(account: &AccountData) -> AccountInfo {
    AccountInfo::from(account)
}

/// Creates the configured administrator account if no account with that
/// email exists yet.
///
/// # Returns
///
/// `true` if the account was created.
///
/// # Errors
///
/// Returns an error if the email or password is invalid or the store fails.
pub fn ensure_admin_account(
    persistence: &mut Persistence,
    email: &str,
    password: &str,
    now: OffsetDateTime,
) -> Result<bool, ApiError> {
    if let Some(existing) = persistence
        .get_account_by_login(email)
        .map_err(translate_persistence_error)?
    {
        if existing.role != Role::Admin.as_str() {
            warn!(
                account_id = existing.account_id,
                role = %existing.role,
                "Configured admin email belongs to a non-admin account"
            );
        }
        return Ok(false);
    }

    let account: AccountData = create_account(
        persistence,
        email,
        "Administrator",
        password,
        Role::Admin,
        now,
    )?;
    info!(
        account_id = account.account_id,
        "Administrator account created"
    );
    Ok(true)
}

/// Summarises the actor's own bookings.
///
/// Upcoming events are the distinct events of confirmed bookings that start
/// after `now`.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn account_dashboard(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<DashboardResponse, ApiError> {
    let bookings: Vec<Booking> = persistence
        .list_bookings_for_account(actor.account_id)
        .map_err(translate_persistence_error)?;

    let confirmed: Vec<&Booking> = bookings
        .iter()
        .filter(|booking| booking.booking_status == BookingStatus::Confirmed)
        .collect();
    let upcoming_events: BTreeSet<i64> = confirmed
        .iter()
        .filter(|booking| booking.event.starts_at > now)
        .map(|booking| booking.event_id)
        .collect();
    let recent_bookings: Vec<BookingInfo> = bookings
        .iter()
        .take(DASHBOARD_RECENT_BOOKINGS)
        .map(|booking| BookingInfo::from_booking(booking, now))
        .collect::<Result<_, _>>()?;

    Ok(DashboardResponse {
        stats: DashboardStats {
            total_bookings: bookings.len(),
            confirmed_bookings: confirmed.len(),
            upcoming_events: upcoming_events.len(),
        },
        recent_bookings,
    })
}

/// Lists one page of accounts, newest first.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the role filter, page or
/// limit is invalid, or the store fails.
pub fn list_accounts(
    persistence: &mut Persistence,
    query: &ListAccountsQuery,
    actor: &AuthenticatedActor,
) -> Result<ListAccountsResponse, ApiError> {
    AuthorizationService::authorize_manage_accounts(actor, "list_accounts")?;

    let role: Option<Role> = query.role.as_deref().map(parse_role).transpose()?;
    let (page, limit): (u32, u32) = page_bounds(query.page, query.limit)?;

    let filter: AccountFilter = AccountFilter {
        role: role.map(|role| role.as_str().to_string()),
        search: query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .map(str::to_string),
    };
    let result: AccountPage = persistence
        .list_accounts(&filter, page, limit)
        .map_err(translate_persistence_error)?;

    Ok(ListAccountsResponse {
        accounts: result.accounts.iter().map(AccountInfo::from).collect(),
        total: result.total,
        total_pages: result.total.div_ceil(u64::from(limit)),
        current_page: page,
        limit,
    })
}

/// Retrieves one account with its bookings, newest first.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the account does not
/// exist, or the store fails.
pub fn get_account(
    persistence: &mut Persistence,
    account_id: i64,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<AccountDetailsResponse, ApiError> {
    AuthorizationService::authorize_manage_accounts(actor, "get_account")?;

    let account: AccountData = load_account(persistence, account_id)?;
    let bookings: Vec<BookingInfo> = persistence
        .list_bookings_for_account(account_id)
        .map_err(translate_persistence_error)?
        .iter()
        .map(|booking| BookingInfo::from_booking(booking, now))
        .collect::<Result<_, _>>()?;

    Ok(AccountDetailsResponse {
        account: AccountInfo::from(&account),
        bookings,
    })
}

/// Changes the role of another account.
///
/// Administrators cannot change their own role, so at least one Admin
/// always remains. Asking for the current role changes nothing.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin, or targets their own account
/// - The role is unknown
/// - The account does not exist
/// - The role changed concurrently, or the store fails
pub fn change_account_role(
    persistence: &mut Persistence,
    account_id: i64,
    request: &ChangeRoleRequest,
    actor: &AuthenticatedActor,
) -> Result<AccountInfo, ApiError> {
    AuthorizationService::authorize_manage_accounts(actor, "change_account_role")?;
    let target: Role = parse_role(&request.role)?;
    if account_id == actor.account_id {
        return Err(ApiError::InvalidTransition {
            message: String::from("Administrators cannot change their own role"),
        });
    }

    let account: AccountData = load_account(persistence, account_id)?;
    if account.role == target.as_str() {
        return Ok(AccountInfo::from(&account));
    }

    let changed: bool = persistence
        .update_account_role(account_id, &account.role, target.as_str())
        .map_err(translate_persistence_error)?;
    if !changed {
        return Err(ApiError::InvalidTransition {
            message: format!("Account {account_id} changed concurrently; try again"),
        });
    }

    info!(
        account_id,
        from = %account.role,
        to = target.as_str(),
        changed_by = actor.account_id,
        "Account role changed"
    );
    Ok(AccountInfo::from(&load_account(persistence, account_id)?))
}

/// Deletes another account that has never booked.
///
/// Bookings and their history keep referring to the account that made them,
/// so an account with bookings is never deleted.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or targets their own
/// account, the account does not exist or has bookings, or the store fails.
pub fn delete_account(
    persistence: &mut Persistence,
    account_id: i64,
    actor: &AuthenticatedActor,
) -> Result<DeleteAccountResponse, ApiError> {
    AuthorizationService::authorize_manage_accounts(actor, "delete_account")?;
    if account_id == actor.account_id {
        return Err(ApiError::InvalidTransition {
            message: String::from("Administrators cannot delete their own account"),
        });
    }

    load_account(persistence, account_id)?;
    let bookings: usize = persistence
        .list_bookings_for_account(account_id)
        .map_err(translate_persistence_error)?
        .len();
    if bookings > 0 {
        return Err(ApiError::InvalidTransition {
            message: format!(
                "Account {account_id} has {bookings} booking(s) and cannot be deleted"
            ),
        });
    }

    let deleted: bool = persistence
        .delete_account(account_id)
        .map_err(translate_persistence_error)?;
    if !deleted {
        return Err(account_not_found(account_id));
    }

    info!(account_id, deleted_by = actor.account_id, "Account deleted");
    Ok(DeleteAccountResponse {
        account_id,
        deleted,
    })
}

/// Returns account totals, counting accounts created in the last 30 days as
/// new.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the store fails.
pub fn account_stats(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<AccountStatsResponse, ApiError> {
    AuthorizationService::authorize_manage_accounts(actor, "account_stats")?;
    persistence
        .account_stats(
            Role::Admin.as_str(),
            Role::Customer.as_str(),
            now - NEW_ACCOUNT_WINDOW,
        )
        .map(AccountStatsResponse::from)
        .map_err(translate_persistence_error)
}

fn parse_role(role: &str) -> Result<Role, ApiError> {
    Role::from_name(role).ok_or_else(|| ApiError::InvalidInput {
        field: String::from("role"),
        message: format!("'{role}' is not a role; expected 'Customer' or 'Admin'"),
    })
}

fn load_account(persistence: &mut Persistence, account_id: i64) -> Result<AccountData, ApiError> {
    persistence
        .get_account_by_id(account_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| account_not_found(account_id))
}

fn account_not_found(account_id: i64) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: String::from("Account"),
        message: format!("Account {account_id} not found"),
    }
}

/// Deletes sessions that expired before `now`.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn purge_expired_sessions(
    persistence: &mut Persistence,
    now: OffsetDateTime,
) -> Result<usize, ApiError> {
    let removed: usize = persistence
        .delete_expired_sessions(now)
        .map_err(translate_persistence_error)?;
    if removed > 0 {
        info!(removed, "Expired sessions removed");
    }
    Ok(removed)
}
