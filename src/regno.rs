//! Registration number digit extraction.
//!
//! The branch taken for a run depends on the parity of two digits pulled
//! out of the registration number. Only ASCII digits count.

use once_cell::sync::Lazy;
use regex::Regex;

/// Two digits followed only by non-digits up to the end of the string
static TAIL_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{2})[^0-9]*$").expect("tail digit pattern is valid"));

/// Any two consecutive digits
static ANY_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{2})").expect("digit pair pattern is valid"));

/// Extract the two-digit number that drives query selection
///
/// Prefers the pair anchored at the tail of the string (ignoring trailing
/// non-digits), then the first pair anywhere. Returns 0 when the input is
/// empty or contains no two consecutive digits, which selects the even branch.
#[must_use]
pub fn extract_last_two_digits(reg_no: &str) -> u32 {
    if reg_no.is_empty() {
        return 0;
    }

    let pair = TAIL_PAIR
        .captures(reg_no)
        .or_else(|| ANY_PAIR.captures(reg_no))
        .and_then(|caps| caps.get(1));

    match pair {
        Some(m) => parse_pair(m.as_str()),
        None => 0,
    }
}

/// Both characters are guaranteed ASCII digits by the patterns above
fn parse_pair(pair: &str) -> u32 {
    pair.bytes()
        .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}
