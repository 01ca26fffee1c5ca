//! # Amount In Words
//!
//! Converts invoice totals into their words expansion for the printed
//! document footer, e.g. `1234.50` becomes
//! `"One Thousand Two Hundred Thirty Four Rupees and Fifty Paisa Only."`.
//!
//! ## Decomposition
//! Uses the South Asian numbering scale:
//! ```text
//! ┌────────────────┬──────────────┬──────────────────────────────┐
//! │ Scale          │ Value        │ Example                      │
//! ├────────────────┼──────────────┼──────────────────────────────┤
//! │ Hundred        │ 100          │ Three Hundred                │
//! │ Thousand       │ 1,000        │ Twelve Thousand              │
//! │ Lakh           │ 1,00,000     │ Five Lakh                    │
//! │ Crore          │ 1,00,00,000  │ Two Crore                    │
//! └────────────────┴──────────────┴──────────────────────────────┘
//! ```
//!
//! ## Defined Inputs
//! The formatter is one-directional and only defined for finite,
//! non-negative amounts. Negative, NaN and infinite inputs are rejected with
//! a typed error rather than producing nonsense on a printed document.

use crate::error::{CoreError, CoreResult};

const ONES: [&str; 10] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];
const TEENS: [&str; 10] = [
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];
const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Converts a whole number to its words expansion.
///
/// ## Example
/// ```rust
/// use pharmapos_core::words::number_to_words;
///
/// assert_eq!(number_to_words(0), "Zero");
/// assert_eq!(number_to_words(100), "One Hundred");
/// assert_eq!(number_to_words(250000), "Two Lakh Fifty Thousand");
/// ```
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }
    segment(n)
}

/// Recursive scale decomposition. Returns an empty string for zero so scale
/// joins stay clean (`"One Thousand"` rather than `"One Thousand Zero"`).
fn segment(n: u64) -> String {
    match n {
        0 => String::new(),
        1..=9 => ONES[n as usize].to_string(),
        10..=19 => TEENS[(n - 10) as usize].to_string(),
        20..=99 => join(TENS[(n / 10) as usize], segment(n % 10)),
        100..=999 => join(&format!("{} Hundred", ONES[(n / 100) as usize]), segment(n % 100)),
        1_000..=99_999 => join(&format!("{} Thousand", segment(n / 1_000)), segment(n % 1_000)),
        100_000..=9_999_999 => {
            join(&format!("{} Lakh", segment(n / 100_000)), segment(n % 100_000))
        }
        _ => join(
            &format!("{} Crore", segment(n / 10_000_000)),
            segment(n % 10_000_000),
        ),
    }
}

/// Joins a head and an optional tail with a single space.
fn join(head: &str, tail: String) -> String {
    if tail.is_empty() {
        head.to_string()
    } else {
        format!("{} {}", head, tail)
    }
}

/// Renders a monetary amount as the invoice footer line.
///
/// The whole part is rendered in Rupees, the fractional part rounded to two
/// digits and rendered as a Paisa suffix. Exactly zero renders as `"Zero"`.
///
/// ## Errors
/// Rejects negative, NaN and infinite input with
/// [`CoreError::UnrepresentableAmount`].
///
/// ## Example
/// ```rust
/// use pharmapos_core::words::amount_in_words;
///
/// assert_eq!(
///     amount_in_words(72.50).unwrap(),
///     "Seventy Two Rupees and Fifty Paisa Only."
/// );
/// ```
pub fn amount_in_words(amount: f64) -> CoreResult<String> {
    if !amount.is_finite() {
        return Err(CoreError::UnrepresentableAmount {
            reason: "amount is not a finite number".to_string(),
        });
    }
    if amount < 0.0 {
        return Err(CoreError::UnrepresentableAmount {
            reason: "amount is negative".to_string(),
        });
    }
    if amount == 0.0 {
        return Ok("Zero".to_string());
    }

    let mut whole = amount.floor() as u64;
    let mut paisa = ((amount - amount.floor()) * 100.0).round() as u64;
    // 4.999 rounds its fraction up to a full rupee
    if paisa == 100 {
        whole += 1;
        paisa = 0;
    }

    let mut result = format!("{} Rupees", segment(whole));
    if paisa > 0 {
        result.push_str(&format!(" and {} Paisa", segment(paisa)));
    }
    result.push_str(" Only.");
    Ok(result)
}

// =============================================================================
// Unit Tests
// =============================================================================
