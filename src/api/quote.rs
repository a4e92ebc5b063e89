// Quote wizard controller
//
// Four steps over one shared set of values. Navigation never validates; the
// review step lists what is still missing but does not block submission.

use crate::models::fields::{FieldKey, FieldValues, QuoteField};
use crate::models::requests::{FormKind, SubmissionPayload};
use crate::models::state::{WizardState, WizardStep};
use crate::utils::logging::redact_fields;
use crate::utils::savings::{format_mwk, lifetime_savings, parse_monthly_bill, PROJECTION_YEARS};

use log::{debug, info};
use thiserror::Error;

pub const THANK_YOU_TITLE: &str = "Thank You!";
pub const THANK_YOU_BODY: &str = "We've received your quote request. Our team will review your information and get back to you within 24 hours with a customized solar solution and pricing.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("submit is only available on the review step (currently on step {0})")]
    NotOnReviewStep(u8),
    #[error("quote request was already submitted")]
    AlreadySubmitted,
}

// =========================
// Option catalogs
// =========================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

const fn opt(value: &'static str, label: &'static str) -> SelectOption {
    SelectOption { value, label }
}

pub const PROPERTY_TYPES: &[SelectOption] = &[
    opt("residential", "Residential"),
    opt("commercial", "Commercial"),
    opt("industrial", "Industrial"),
];

pub const ROOF_TYPES: &[SelectOption] = &[
    opt("shingle", "Shingle"),
    opt("tile", "Tile"),
    opt("metal", "Metal"),
    opt("flat", "Flat"),
    opt("other", "Other"),
];

pub const SYSTEM_TYPES: &[SelectOption] = &[
    opt("on-grid", "On-Grid"),
    opt("off-grid", "Off-Grid"),
    opt("hybrid", "Hybrid"),
];

pub const BATTERY_OPTIONS: &[SelectOption] = &[
    opt("yes", "Yes, I want battery storage"),
    opt("no", "No, grid-tied only"),
    opt("maybe", "Maybe, need more info"),
];

pub const BUDGET_RANGES: &[SelectOption] = &[
    opt("under-15m", "Under MWK 15 Million"),
    opt("15m-40m", "MWK 15 Million - 40 Million"),
    opt("40m-80m", "MWK 40 Million - 80 Million"),
    opt("80m-plus", "MWK 80 Million+"),
];

/// Choices for a select field; `None` for free text.
pub fn options_for(field: QuoteField) -> Option<&'static [SelectOption]> {
    match field {
        QuoteField::PropertyType => Some(PROPERTY_TYPES),
        QuoteField::RoofType => Some(ROOF_TYPES),
        QuoteField::SystemType => Some(SYSTEM_TYPES),
        QuoteField::BatteryStorage => Some(BATTERY_OPTIONS),
        QuoteField::Budget => Some(BUDGET_RANGES),
        _ => None,
    }
}

/// Hint shown while a field is empty.
pub fn placeholder(field: QuoteField) -> &'static str {
    match field {
        QuoteField::Name => "John Doe",
        QuoteField::Email => "john@example.com",
        QuoteField::Phone => "+265 123 456 789",
        QuoteField::Address => "123 Main Street, City, State ZIP",
        QuoteField::PropertyType => "Select property type",
        QuoteField::RoofType => "Select roof type",
        QuoteField::MonthlyBill => "MWK 150,000",
        QuoteField::SystemType => "Select system type",
        QuoteField::BatteryStorage => "Select option",
        QuoteField::Budget => "Select budget range",
        QuoteField::Notes => "Any additional information or questions...",
    }
}

/// Display label for a stored option value, if it is one of the field's choices.
pub fn option_label(field: QuoteField, value: &str) -> Option<&'static str> {
    options_for(field)?
        .iter()
        .find(|o| o.value == value)
        .map(|o| o.label)
}

/// Next (or previous) choice after `current`. An empty or unknown value moves
/// to the first (or last) choice; the ends wrap around.
pub fn cycle_option(options: &[SelectOption], current: &str, forward: bool) -> &'static str {
    cycle_index(options, current, forward)
        .map(|i| options[i].value)
        .unwrap_or("")
}

fn cycle_index(options: &[SelectOption], current: &str, forward: bool) -> Option<usize> {
    if options.is_empty() {
        return None;
    }
    let last = options.len() - 1;
    let next = match options.iter().position(|o| o.value == current) {
        None if forward => 0,
        None => last,
        Some(i) if forward => (i + 1) % options.len(),
        Some(0) => last,
        Some(i) => i - 1,
    };
    Some(next)
}

// =========================
// Review
// =========================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSection {
    pub title: &'static str,
    pub lines: Vec<String>,
}

// =========================
// Wizard
// =========================

#[derive(Debug, Clone, Default)]
pub struct QuoteWizard {
    state: WizardState,
    values: FieldValues<QuoteField>,
}

impl QuoteWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.state.step()
    }

    pub fn is_submitted(&self) -> bool {
        self.state.is_submitted()
    }

    pub fn advance(&mut self) -> bool {
        let moved = self.state.advance();
        if moved {
            debug!(
                "[PHASE: wizard] [STEP: navigation] Advanced to step {} ({})",
                self.step(),
                self.step().title()
            );
        }
        moved
    }

    pub fn retreat(&mut self) -> bool {
        let moved = self.state.retreat();
        if moved {
            debug!(
                "[PHASE: wizard] [STEP: navigation] Went back to step {} ({})",
                self.step(),
                self.step().title()
            );
        }
        moved
    }

    pub fn set_field(&mut self, field: QuoteField, value: impl Into<String>) {
        self.values.set(field, value);
    }

    pub fn value(&self, field: QuoteField) -> &str {
        self.values.get(field)
    }

    pub fn values(&self) -> &FieldValues<QuoteField> {
        &self.values
    }

    /// Fields entered on a step. The review step has none.
    pub fn fields_on_step(step: WizardStep) -> &'static [QuoteField] {
        match step.number() {
            1 => &[QuoteField::Name, QuoteField::Email, QuoteField::Phone],
            2 => &[
                QuoteField::Address,
                QuoteField::PropertyType,
                QuoteField::RoofType,
                QuoteField::MonthlyBill,
            ],
            3 => &[
                QuoteField::SystemType,
                QuoteField::BatteryStorage,
                QuoteField::Budget,
                QuoteField::Notes,
            ],
            _ => &[],
        }
    }

    /// Required fields that are still blank, in form order.
    pub fn missing_required(&self) -> Vec<QuoteField> {
        QuoteField::ALL
            .iter()
            .copied()
            .filter(|f| f.is_required() && self.values.get(*f).trim().is_empty())
            .collect()
    }

    /// Estimated savings for the entered monthly bill, when it parses.
    pub fn estimated_savings(&self) -> Option<u64> {
        parse_monthly_bill(self.values.get(QuoteField::MonthlyBill)).map(lifetime_savings)
    }

    pub fn review(&self) -> Vec<ReviewSection> {
        let v = |f| self.values.get(f).to_string();

        let mut property = vec![
            v(QuoteField::Address),
            format!(
                "{} - {} roof",
                self.values.get(QuoteField::PropertyType),
                self.values.get(QuoteField::RoofType)
            ),
            format!("Monthly bill: {}", self.values.get(QuoteField::MonthlyBill)),
        ];
        if let Some(savings) = self.estimated_savings() {
            property.push(format!(
                "Estimated {}-year savings: {}",
                PROJECTION_YEARS,
                format_mwk(savings)
            ));
        }

        let mut system = vec![
            format!("System: {}", self.values.get(QuoteField::SystemType)),
            format!("Battery: {}", self.values.get(QuoteField::BatteryStorage)),
            format!("Budget: {}", self.values.get(QuoteField::Budget)),
        ];
        let notes = self.values.get(QuoteField::Notes).trim();
        if !notes.is_empty() {
            system.push(format!("Notes: {}", notes));
        }

        vec![
            ReviewSection {
                title: "Contact Information",
                lines: vec![v(QuoteField::Name), v(QuoteField::Email), v(QuoteField::Phone)],
            },
            ReviewSection {
                title: "Property Details",
                lines: property,
            },
            ReviewSection {
                title: "System Preferences",
                lines: system,
            },
        ]
    }

    /// Finish the wizard. Only valid on the review step, and only once.
    pub fn submit(&mut self) -> Result<SubmissionPayload, WizardError> {
        if self.state.is_submitted() {
            return Err(WizardError::AlreadySubmitted);
        }
        if !self.step().is_last() {
            return Err(WizardError::NotOnReviewStep(self.step().number()));
        }

        self.state.mark_submitted();
        let payload = SubmissionPayload::from_fields(FormKind::Quote, &self.values);
        info!(
            "[PHASE: submission] [STEP: quote] Quote form submitted (correlation_id={}) {:?}",
            payload.correlation_id,
            redact_fields(&payload.fields)
        );
        Ok(payload)
    }
}
