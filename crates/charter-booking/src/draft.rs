//! Booking sheet state.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::BookingError;
use crate::slots::{self, DayAvailability};

/// What the customer has picked so far for one yacht. Nothing is
/// persisted until [`crate::BookingService::submit`]; dropping the
/// draft discards it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    yacht_id: Uuid,
    date: Option<NaiveDate>,
    duration_hours: u32,
    selected_start: Option<u32>,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: String,
}

impl BookingDraft {
    pub fn new(yacht_id: Uuid, duration_hours: u32) -> Result<Self, BookingError> {
        Ok(Self {
            yacht_id,
            date: None,
            duration_hours: slots::validate_duration(duration_hours)?,
            selected_start: None,
            guest_name: String::new(),
            guest_email: String::new(),
            guest_phone: String::new(),
        })
    }

    pub fn yacht_id(&self) -> Uuid {
        self.yacht_id
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn duration_hours(&self) -> u32 {
        self.duration_hours
    }

    pub fn selected_start(&self) -> Option<u32> {
        self.selected_start
    }

    /// A different date invalidates the selected slot.
    pub fn set_date(&mut self, date: NaiveDate) {
        if self.date != Some(date) {
            self.date = Some(date);
            self.selected_start = None;
        }
    }

    /// A different duration changes every slot's window, so the
    /// selection is cleared.
    pub fn set_duration(&mut self, hours: u32) -> Result<(), BookingError> {
        let hours = slots::validate_duration(hours)?;
        if hours != self.duration_hours {
            self.duration_hours = hours;
            self.selected_start = None;
        }
        Ok(())
    }

    /// Selects a start time that `availability` (computed for this
    /// draft's duration) shows as free.
    pub fn select_slot(
        &mut self,
        start_hour: u32,
        availability: &DayAvailability,
    ) -> Result<(), BookingError> {
        if availability.duration_hours != self.duration_hours {
            return Err(BookingError::StaleAvailability);
        }
        match availability.slot(start_hour) {
            None => Err(BookingError::UnknownSlot(start_hour)),
            Some(slot) if slot.blocked => Err(BookingError::SlotUnavailable(start_hour)),
            Some(_) => {
                self.selected_start = Some(start_hour);
                Ok(())
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_start = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::{BASE_TIME_SLOTS, availability};
    use charter_core::models::reservation::BookedInterval;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 20).unwrap()
    }

    fn draft_with_selection() -> BookingDraft {
        let mut draft = BookingDraft::new(Uuid::new_v4(), 3).unwrap();
        draft.set_date(day());
        let free = availability(&[], 3, &BASE_TIME_SLOTS).unwrap();
        draft.select_slot(12, &free).unwrap();
        draft
    }

    #[test]
    fn changing_duration_clears_selection() {
        let mut draft = draft_with_selection();
        draft.set_duration(4).unwrap();
        assert_eq!(draft.selected_start(), None);
        assert_eq!(draft.duration_hours(), 4);
    }

    #[test]
    fn same_duration_keeps_selection() {
        let mut draft = draft_with_selection();
        draft.set_duration(3).unwrap();
        assert_eq!(draft.selected_start(), Some(12));
    }

    #[test]
    fn changing_date_clears_selection() {
        let mut draft = draft_with_selection();
        draft.set_date(day().succ_opt().unwrap());
        assert_eq!(draft.selected_start(), None);
    }

    #[test]
    fn invalid_duration_leaves_draft_untouched() {
        let mut draft = draft_with_selection();
        assert!(draft.set_duration(12).is_err());
        assert_eq!(draft.duration_hours(), 3);
        assert_eq!(draft.selected_start(), Some(12));
    }

    #[test]
    fn drafts_start_with_a_bookable_duration() {
        for hours in [0, 1, 11] {
            assert!(matches!(
                BookingDraft::new(Uuid::new_v4(), hours),
                Err(BookingError::InvalidDuration { .. })
            ));
        }
        assert_eq!(BookingDraft::new(Uuid::new_v4(), 10).unwrap().duration_hours(), 10);
    }

    #[test]
    fn blocked_or_unknown_slots_cannot_be_selected() {
        let mut draft = BookingDraft::new(Uuid::new_v4(), 3).unwrap();
        let day = availability(&[BookedInterval::new(12, Some(2))], 3, &BASE_TIME_SLOTS).unwrap();
        assert!(matches!(
            draft.select_slot(12, &day),
            Err(BookingError::SlotUnavailable(12))
        ));
        assert!(matches!(
            draft.select_slot(13, &day),
            Err(BookingError::UnknownSlot(13))
        ));
        assert_eq!(draft.selected_start(), None);
    }

    #[test]
    fn stale_availability_is_rejected() {
        let mut draft = BookingDraft::new(Uuid::new_v4(), 3).unwrap();
        let other = availability(&[], 5, &BASE_TIME_SLOTS).unwrap();
        assert!(matches!(
            draft.select_slot(6, &other),
            Err(BookingError::StaleAvailability)
        ));
    }
}
