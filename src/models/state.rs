// Wizard navigation state (in-memory)
//
// NOTE: This is NOT persisted; one instance lives for as long as the form is on screen.

use std::fmt;

/// One of the four quote wizard steps. Always within `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WizardStep(u8);

impl WizardStep {
    pub const BASIC_INFO: Self = Self(1);
    pub const PROPERTY_DETAILS: Self = Self(2);
    pub const SYSTEM_PREFERENCES: Self = Self(3);
    pub const REVIEW: Self = Self(4);

    pub const FIRST: Self = Self::BASIC_INFO;
    pub const LAST: Self = Self::REVIEW;

    /// Panics when `number` is outside `1..=4`.
    pub fn new(number: u8) -> Self {
        assert!(
            (Self::FIRST.0..=Self::LAST.0).contains(&number),
            "wizard step {} outside {}..={}",
            number,
            Self::FIRST.0,
            Self::LAST.0
        );
        Self(number)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn next(self) -> Option<Self> {
        (self.0 < Self::LAST.0).then(|| Self(self.0 + 1))
    }

    pub fn prev(self) -> Option<Self> {
        (self.0 > Self::FIRST.0).then(|| Self(self.0 - 1))
    }

    pub fn is_first(self) -> bool {
        self == Self::FIRST
    }

    pub fn is_last(self) -> bool {
        self == Self::LAST
    }

    pub fn title(self) -> &'static str {
        match self.0 {
            1 => "Basic Information",
            2 => "Property Details",
            3 => "System Preferences",
            _ => "Review & Submit",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (Self::FIRST.0..=Self::LAST.0).map(Self)
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a gateway call is in flight for a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WizardState {
    step: WizardStep,
    submitted: bool,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Move forward one step. Clamped at the review step; ignored once submitted.
    pub fn advance(&mut self) -> bool {
        if self.submitted {
            return false;
        }
        match self.step.next() {
            Some(s) => {
                self.step = s;
                true
            }
            None => false,
        }
    }

    /// Move back one step. Clamped at the first step; ignored once submitted.
    pub fn retreat(&mut self) -> bool {
        if self.submitted {
            return false;
        }
        match self.step.prev() {
            Some(s) => {
                self.step = s;
                true
            }
            None => false,
        }
    }

    pub(crate) fn mark_submitted(&mut self) {
        self.submitted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_first_step_unsubmitted() {
        let state = WizardState::new();
        assert_eq!(state.step(), WizardStep::BASIC_INFO);
        assert!(!state.is_submitted());
    }

    #[test]
    fn advance_and_retreat_are_clamped() {
        let mut state = WizardState::new();
        assert!(!state.retreat());
        assert_eq!(state.step().number(), 1);

        for expected in 2..=4 {
            assert!(state.advance());
            assert_eq!(state.step().number(), expected);
        }
        assert!(!state.advance());
        assert_eq!(state.step(), WizardStep::REVIEW);
    }

    #[test]
    fn navigation_is_frozen_after_submit() {
        let mut state = WizardState::new();
        state.advance();
        state.mark_submitted();
        assert!(!state.advance());
        assert!(!state.retreat());
        assert_eq!(state.step().number(), 2);
    }

    #[test]
    fn step_titles_follow_the_form() {
        let titles: Vec<_> = WizardStep::all().map(WizardStep::title).collect();
        assert_eq!(
            titles,
            vec![
                "Basic Information",
                "Property Details",
                "System Preferences",
                "Review & Submit"
            ]
        );
    }

    #[test]
    #[should_panic(expected = "outside 1..=4")]
    fn out_of_range_step_fails_fast() {
        let _ = WizardStep::new(5);
    }

    #[test]
    #[should_panic(expected = "outside 1..=4")]
    fn step_zero_fails_fast() {
        let _ = WizardStep::new(0);
    }
}
