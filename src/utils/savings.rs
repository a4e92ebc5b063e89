//! Solar savings estimator.
//!
//! Flat model: 70% of the monthly electricity bill is saved, projected over
//! twenty years with no inflation adjustment. Amounts are whole Malawian kwacha.

pub const MIN_MONTHLY_BILL_MWK: u64 = 20_000;
pub const MAX_MONTHLY_BILL_MWK: u64 = 1_000_000;
pub const BILL_STEP_MWK: u64 = 5_000;
pub const DEFAULT_MONTHLY_BILL_MWK: u64 = 150_000;

pub const SAVINGS_RATE: f64 = 0.7;
pub const PROJECTION_YEARS: u32 = 20;
const MONTHS_PER_YEAR: u32 = 12;

/// Estimated savings over the projection period for a monthly bill.
pub fn lifetime_savings(monthly_bill_mwk: u64) -> u64 {
    let monthly = monthly_bill_mwk as f64 * SAVINGS_RATE;
    let yearly = monthly * f64::from(MONTHS_PER_YEAR);
    (yearly * f64::from(PROJECTION_YEARS)).round() as u64
}

/// Clamp to the slider range and snap to the nearest step.
pub fn snap_to_slider(monthly_bill_mwk: u64) -> u64 {
    let clamped = monthly_bill_mwk.clamp(MIN_MONTHLY_BILL_MWK, MAX_MONTHLY_BILL_MWK);
    let offset = clamped - MIN_MONTHLY_BILL_MWK;
    let steps = (offset + BILL_STEP_MWK / 2) / BILL_STEP_MWK;
    (MIN_MONTHLY_BILL_MWK + steps * BILL_STEP_MWK).min(MAX_MONTHLY_BILL_MWK)
}

/// Parse what people type into the monthly bill box: `150000`, `150,000`, `MWK 150,000`, `MK150000.50`.
pub fn parse_monthly_bill(input: &str) -> Option<u64> {
    let mut s = input.trim();
    for prefix in ["MWK", "mwk", "MK", "mk", "K"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest.trim_start();
            break;
        }
    }
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '_'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    if cleaned.contains('.') {
        let v: f64 = cleaned.parse().ok()?;
        if !v.is_finite() || v < 0.0 {
            return None;
        }
        return Some(v.round() as u64);
    }
    cleaned.parse().ok()
}

/// `MWK 25,200,000`
pub fn format_mwk(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("MWK {}", out)
}
