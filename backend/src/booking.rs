//! Availability, counter and status rules for bookings.
//!
//! Everything here is pure; the routes load rows, ask these functions what the
//! new state should be, and persist the answer inside one transaction.

use chrono::{NaiveDate, NaiveDateTime};
use common::{ActivityReservationStatus, ActivityStatus, PaymentStatus, ReservationStatus};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BookingError {
    #[error("Check-out date must be after check-in date")]
    InvalidStay,

    #[error("End time must be after start time")]
    InvalidSchedule,

    #[error("Start time cannot be in the past")]
    StartInPast,

    #[error("Room does not belong to the specified hotel")]
    RoomNotInHotel,

    #[error("Room is not available for the selected dates")]
    RoomUnavailable,

    #[error("Not enough available rooms: {requested} requested, {available} available")]
    NotEnoughRooms { requested: i64, available: i64 },

    #[error("Not enough available slots: {requested} requested, {available} available")]
    NotEnoughSlots { requested: i64, available: i64 },

    #[error("Activity is not available for booking")]
    ActivityNotBookable,

    #[error("Capacity {requested} is below the {booked} places already booked")]
    CapacityBelowBooked { requested: i64, booked: i64 },

    #[error("Cannot {action}: reservation is {status}")]
    IllegalTransition {
        action: &'static str,
        status: &'static str,
    },

    #[error("Cannot change payment from {from} to {to}")]
    IllegalPayment {
        from: &'static str,
        to: &'static str,
    },

    #[error("Payment must be completed before check-in")]
    PaymentRequired,

    #[error("Cannot check-in before the scheduled check-in date")]
    CheckInTooEarly,
}

impl BookingError {
    /// Malformed requests, as opposed to requests that clash with current state.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            BookingError::InvalidStay
                | BookingError::InvalidSchedule
                | BookingError::StartInPast
                | BookingError::RoomNotInHotel
        )
    }
}

// --- Stays ---

/// A half-open `[check_in, check_out)` range of nights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, BookingError> {
        if check_out <= check_in {
            return Err(BookingError::InvalidStay);
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Back-to-back stays (one leaves the day the next arrives) do not overlap.
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.check_in < other.check_out && self.check_out > other.check_in
    }
}

pub fn is_room_free(requested: &StayRange, booked: &[StayRange]) -> bool {
    !booked.iter().any(|stay| requested.overlaps(stay))
}

pub fn stay_price(price_per_night: f64, stay: &StayRange, rooms: i64) -> f64 {
    price_per_night * stay.nights() as f64 * rooms as f64
}

pub fn activity_price(price: f64, participants: i64) -> f64 {
    price * participants as f64
}

// --- Counters ---

pub fn reserve_rooms(available: i64, requested: i64) -> Result<i64, BookingError> {
    if requested > available {
        return Err(BookingError::NotEnoughRooms {
            requested,
            available,
        });
    }
    Ok(available - requested)
}

pub fn release_rooms(available: i64, released: i64, total: i64) -> i64 {
    (available + released).clamp(0, total)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotUpdate {
    pub available_slots: i64,
    pub status: ActivityStatus,
}

/// Applies `change` (negative to book, positive to release) to an activity's slots.
pub fn adjust_slots(
    available: i64,
    capacity: i64,
    status: ActivityStatus,
    change: i64,
) -> Result<SlotUpdate, BookingError> {
    let next = available + change;
    if next < 0 {
        return Err(BookingError::NotEnoughSlots {
            requested: -change,
            available,
        });
    }
    let available_slots = next.min(capacity);
    Ok(SlotUpdate {
        available_slots,
        status: status_for_slots(status, available_slots),
    })
}

/// Changes capacity while keeping every seat that is already booked.
pub fn resize_capacity(
    capacity: i64,
    available: i64,
    status: ActivityStatus,
    new_capacity: i64,
) -> Result<SlotUpdate, BookingError> {
    let booked = capacity - available;
    if new_capacity < booked {
        return Err(BookingError::CapacityBelowBooked {
            requested: new_capacity,
            booked,
        });
    }
    let available_slots = new_capacity - booked;
    Ok(SlotUpdate {
        available_slots,
        status: status_for_slots(status, available_slots),
    })
}

fn status_for_slots(status: ActivityStatus, available_slots: i64) -> ActivityStatus {
    match status {
        ActivityStatus::Active | ActivityStatus::Full if available_slots == 0 => {
            ActivityStatus::Full
        }
        ActivityStatus::Full => ActivityStatus::Active,
        other => other,
    }
}

pub fn validate_schedule(
    start: NaiveDateTime,
    end: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<(), BookingError> {
    if end <= start {
        return Err(BookingError::InvalidSchedule);
    }
    if start < now {
        return Err(BookingError::StartInPast);
    }
    Ok(())
}

// --- Status transitions ---

/// The states both hotel stays and activity bookings move through.
pub trait Lifecycle: Copy + PartialEq {
    const CREATED: Self;
    const CONFIRMED: Self;
    const CHECKED_IN: Self;
    const CANCELLED: Self;

    fn label(&self) -> &'static str;

    /// Still holding rooms or slots and not yet in use.
    fn is_open(&self) -> bool {
        *self == Self::CREATED || *self == Self::CONFIRMED
    }
}

impl Lifecycle for ReservationStatus {
    const CREATED: Self = ReservationStatus::Created;
    const CONFIRMED: Self = ReservationStatus::Confirmed;
    const CHECKED_IN: Self = ReservationStatus::CheckedIn;
    const CANCELLED: Self = ReservationStatus::Cancelled;

    fn label(&self) -> &'static str {
        self.as_str()
    }
}

impl Lifecycle for ActivityReservationStatus {
    const CREATED: Self = ActivityReservationStatus::Created;
    const CONFIRMED: Self = ActivityReservationStatus::Confirmed;
    const CHECKED_IN: Self = ActivityReservationStatus::CheckedIn;
    const CANCELLED: Self = ActivityReservationStatus::Cancelled;

    fn label(&self) -> &'static str {
        self.as_str()
    }
}

fn payment_allowed(from: PaymentStatus, to: PaymentStatus) -> bool {
    matches!(
        (from, to),
        (PaymentStatus::Pending, PaymentStatus::Paid)
            | (PaymentStatus::Pending, PaymentStatus::Failed)
            | (PaymentStatus::Failed, PaymentStatus::Paid)
            | (PaymentStatus::Paid, PaymentStatus::Refunded)
    )
}

/// Records a payment outcome and returns the booking status that follows.
///
/// A successful payment confirms a freshly created booking. Refunds are the
/// only payment change allowed once a booking is closed.
pub fn record_payment<S: Lifecycle>(
    status: S,
    current: PaymentStatus,
    next: PaymentStatus,
) -> Result<S, BookingError> {
    if !payment_allowed(current, next) {
        return Err(BookingError::IllegalPayment {
            from: current.as_str(),
            to: next.as_str(),
        });
    }
    if next != PaymentStatus::Refunded && !status.is_open() {
        return Err(BookingError::IllegalTransition {
            action: "record payment",
            status: status.label(),
        });
    }
    if next == PaymentStatus::Paid && status == S::CREATED {
        return Ok(S::CONFIRMED);
    }
    Ok(status)
}

pub fn cancel<S: Lifecycle>(status: S) -> Result<S, BookingError> {
    if !status.is_open() {
        return Err(BookingError::IllegalTransition {
            action: "cancel",
            status: status.label(),
        });
    }
    Ok(S::CANCELLED)
}

pub fn check_in<S: Lifecycle>(status: S, payment: PaymentStatus) -> Result<S, BookingError> {
    if status != S::CONFIRMED {
        return Err(BookingError::IllegalTransition {
            action: "check in",
            status: status.label(),
        });
    }
    if payment != PaymentStatus::Paid {
        return Err(BookingError::PaymentRequired);
    }
    Ok(S::CHECKED_IN)
}

/// Hotel check-in additionally waits for the arrival date.
pub fn check_in_stay(
    status: ReservationStatus,
    payment: PaymentStatus,
    check_in_date: NaiveDate,
    today: NaiveDate,
) -> Result<ReservationStatus, BookingError> {
    let next = check_in(status, payment)?;
    if check_in_date > today {
        return Err(BookingError::CheckInTooEarly);
    }
    Ok(next)
}

pub fn check_out(status: ReservationStatus) -> Result<ReservationStatus, BookingError> {
    if status != ReservationStatus::CheckedIn {
        return Err(BookingError::IllegalTransition {
            action: "check out",
            status: status.label(),
        });
    }
    Ok(ReservationStatus::CheckedOut)
}

pub fn complete(
    status: ActivityReservationStatus,
) -> Result<ActivityReservationStatus, BookingError> {
    match status {
        ActivityReservationStatus::CheckedIn | ActivityReservationStatus::Confirmed => {
            Ok(ActivityReservationStatus::Completed)
        }
        other => Err(BookingError::IllegalTransition {
            action: "complete",
            status: other.label(),
        }),
    }
}
