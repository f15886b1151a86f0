//! Time-slot conflict engine.
//!
//! Everything here is a pure function of already-fetched reservation
//! intervals. The result is a preview for the booking sheet; the store
//! re-checks overlap when the reservation is written.

use std::collections::BTreeSet;

use charter_core::models::reservation::BookedInterval;
use serde::Serialize;

use crate::error::BookingError;

pub const MIN_DURATION_HOURS: u32 = 2;
pub const MAX_DURATION_HOURS: u32 = 10;

/// A start time a charter may begin at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CandidateSlot {
    pub start_hour: u32,
    pub label: &'static str,
}

impl CandidateSlot {
    pub const fn new(start_hour: u32, label: &'static str) -> Self {
        Self { start_hour, label }
    }
}

/// The fixed start times offered every day, ascending.
pub const BASE_TIME_SLOTS: [CandidateSlot; 6] = [
    CandidateSlot::new(6, "6:00 AM"),
    CandidateSlot::new(9, "9:00 AM"),
    CandidateSlot::new(12, "12:00 PM"),
    CandidateSlot::new(15, "3:00 PM"),
    CandidateSlot::new(19, "7:00 PM"),
    CandidateSlot::new(22, "10:00 PM"),
];

/// Rendered state of one candidate for a given day and duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotState {
    pub start_hour: u32,
    pub label: &'static str,
    /// Exclusive end hour, not wrapped; may exceed 24.
    pub end_hour: u32,
    pub end_label: String,
    pub blocked: bool,
    /// The window runs past midnight into the next calendar day.
    /// Reservations on that next day are not consulted.
    pub crosses_midnight: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayAvailability {
    pub duration_hours: u32,
    pub slots: Vec<SlotState>,
    /// Every candidate is blocked; the caller should suggest another
    /// duration or date.
    pub all_blocked: bool,
}

impl DayAvailability {
    pub fn slot(&self, start_hour: u32) -> Option<&SlotState> {
        self.slots.iter().find(|s| s.start_hour == start_hour)
    }

    pub fn is_blocked(&self, start_hour: u32) -> bool {
        self.slot(start_hour).is_none_or(|s| s.blocked)
    }

    pub fn free_slots(&self) -> impl Iterator<Item = &SlotState> {
        self.slots.iter().filter(|s| !s.blocked)
    }
}

pub fn validate_duration(hours: u32) -> Result<u32, BookingError> {
    if (MIN_DURATION_HOURS..=MAX_DURATION_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(BookingError::InvalidDuration {
            hours,
            min: MIN_DURATION_HOURS,
            max: MAX_DURATION_HOURS,
        })
    }
}

/// Half-open `[start, start + duration)` against a booked interval.
/// Touching ends do not overlap.
pub fn overlaps(start_hour: u32, duration_hours: u32, booked: &BookedInterval) -> bool {
    let end_hour = start_hour + duration_hours;
    !(end_hour <= booked.start_hour || start_hour >= booked.end_hour())
}

/// Start hours of the candidates that would overlap any booked interval
/// when held for `duration_hours`.
pub fn blocked_slots(
    booked: &[BookedInterval],
    duration_hours: u32,
    candidates: &[CandidateSlot],
) -> BTreeSet<u32> {
    candidates
        .iter()
        .filter(|c| booked.iter().any(|b| overlaps(c.start_hour, duration_hours, b)))
        .map(|c| c.start_hour)
        .collect()
}

pub fn availability(
    booked: &[BookedInterval],
    duration_hours: u32,
    candidates: &[CandidateSlot],
) -> Result<DayAvailability, BookingError> {
    let duration_hours = validate_duration(duration_hours)?;
    let blocked = blocked_slots(booked, duration_hours, candidates);

    let slots: Vec<SlotState> = candidates
        .iter()
        .map(|c| {
            let end_hour = c.start_hour + duration_hours;
            SlotState {
                start_hour: c.start_hour,
                label: c.label,
                end_hour,
                end_label: format_hour(end_hour),
                blocked: blocked.contains(&c.start_hour),
                crosses_midnight: end_hour > 24,
            }
        })
        .collect();
    let all_blocked = !slots.is_empty() && slots.iter().all(|s| s.blocked);

    Ok(DayAvailability {
        duration_hours,
        slots,
        all_blocked,
    })
}

/// 12-hour clock label for an hour of day; hours past 24 are shown on
/// the following day's clock.
pub fn format_hour(hour: u32) -> String {
    let hour = hour % 24;
    let period = if hour >= 12 { "PM" } else { "AM" };
    let display = match hour {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    format!("{display}:00 {period}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booked(start: u32, hours: Option<u32>) -> BookedInterval {
        BookedInterval::new(start, hours)
    }

    #[test]
    fn boundary_touch_is_not_overlap() {
        // 09:00 for 3h, candidates of 3h.
        let blocked = blocked_slots(&[booked(9, Some(3))], 3, &BASE_TIME_SLOTS);
        assert_eq!(blocked, BTreeSet::from([9]));
    }

    #[test]
    fn long_window_blocks_everything_reaching_the_booking() {
        let blocked = blocked_slots(&[booked(19, Some(2))], 10, &BASE_TIME_SLOTS);
        assert_eq!(blocked, BTreeSet::from([12, 15, 19]));
        // 22:00 starts after 21:00; 06:00 ends at 16:00.
        assert!(!blocked.contains(&22));
        assert!(!blocked.contains(&6));
    }

    #[test]
    fn unset_duration_counts_as_two_hours() {
        let blocked = blocked_slots(&[booked(12, None)], 2, &BASE_TIME_SLOTS);
        assert_eq!(blocked, BTreeSet::from([12]));
        let blocked = blocked_slots(&[booked(10, None)], 2, &BASE_TIME_SLOTS);
        assert_eq!(blocked, BTreeSet::from([9]));
    }

    #[test]
    fn no_bookings_means_nothing_blocked() {
        let day = availability(&[], 4, &BASE_TIME_SLOTS).unwrap();
        assert!(day.slots.iter().all(|s| !s.blocked));
        assert!(!day.all_blocked);
        assert_eq!(day.free_slots().count(), BASE_TIME_SLOTS.len());
    }

    #[test]
    fn all_blocked_is_reported() {
        let day = availability(&[booked(0, Some(24))], 2, &BASE_TIME_SLOTS).unwrap();
        assert!(day.all_blocked);
        assert!(day.is_blocked(6));
    }

    #[test]
    fn duration_outside_range_is_rejected() {
        assert!(matches!(
            availability(&[], 1, &BASE_TIME_SLOTS),
            Err(BookingError::InvalidDuration { hours: 1, .. })
        ));
        assert!(availability(&[], 11, &BASE_TIME_SLOTS).is_err());
        assert!(availability(&[], 0, &BASE_TIME_SLOTS).is_err());
        assert!(availability(&[], 10, &BASE_TIME_SLOTS).is_ok());
    }

    #[test]
    fn late_slots_are_flagged_as_crossing_midnight() {
        let day = availability(&[], 5, &BASE_TIME_SLOTS).unwrap();
        let late = day.slot(22).unwrap();
        assert_eq!(late.end_hour, 27);
        assert_eq!(late.end_label, "3:00 AM");
        assert!(late.crosses_midnight);
        assert!(!day.slot(19).unwrap().crosses_midnight);
    }

    #[test]
    fn ending_exactly_at_midnight_does_not_cross() {
        let day = availability(&[], 2, &BASE_TIME_SLOTS).unwrap();
        let late = day.slot(22).unwrap();
        assert_eq!(late.end_label, "12:00 AM");
        assert!(!late.crosses_midnight);
    }

    #[test]
    fn unknown_start_counts_as_blocked() {
        let day = availability(&[], 3, &BASE_TIME_SLOTS).unwrap();
        assert!(day.is_blocked(7));
    }

    #[test]
    fn hour_labels() {
        assert_eq!(format_hour(6), "6:00 AM");
        assert_eq!(format_hour(12), "12:00 PM");
        assert_eq!(format_hour(15), "3:00 PM");
        assert_eq!(format_hour(24), "12:00 AM");
        for slot in BASE_TIME_SLOTS {
            assert_eq!(format_hour(slot.start_hour), slot.label);
        }
    }
}
