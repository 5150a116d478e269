//! Free-text heuristics for booking requests
//!
//! Booking requests arrive with a service and a schedule preference typed by
//! the client, so both are matched best-effort against structured data. The
//! rules here are explicit, ordered fallbacks that return tagged outcomes;
//! callers (and tests) can see which branch fired instead of only the final
//! value. None of them ever fails: an unmatchable input lands on the
//! documented default.

use chrono::{NaiveDate, NaiveTime};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::Service;

/// Literal separator between date and time in a structured preference,
/// e.g. `"2025-03-10 a las 16:30"`.
pub const SCHEDULE_SEPARATOR: &str = " a las ";

/// Time assumed when the preference carries none.
pub const DEFAULT_TIME: &str = "10:00";

/// Tokens shorter than this many characters are too generic to match on
/// (articles, prepositions, "de", "con", ...).
pub const MIN_TOKEN_CHARS: usize = 3;

/// Case- and accent-insensitive comparison form of a text.
#[must_use]
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .trim()
        .to_lowercase()
}

/// Match tokens of a requested service: folded words longer than
/// [`MIN_TOKEN_CHARS`], in their original order.
#[must_use]
pub fn tokens(text: &str) -> Vec<String> {
    fold(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > MIN_TOKEN_CHARS)
        .map(ToString::to_string)
        .collect()
}

/// Which branch produced a parsed schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ScheduleSource {
    /// Both date and time came from the preference text
    Parsed,
    /// Separator missing or unparseable; defaulted to today at [`DEFAULT_TIME`]
    Fallback,
}

/// A schedule resolved from free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Appointment date
    pub date: NaiveDate,
    /// Appointment time as `HH:MM`
    pub time: String,
    /// Branch that produced the values
    pub source: ScheduleSource,
}

/// Parse a schedule preference of the form `"<date> a las <time>"`.
///
/// This is a best-effort heuristic, not a guarantee of correctness: anything
/// that does not split on the separator into a `YYYY-MM-DD` date and an
/// `HH:MM` time falls back to `today` at [`DEFAULT_TIME`].
#[must_use]
pub fn parse_time_preference(text: &str, today: NaiveDate) -> Schedule {
    if let Some((date_part, time_part)) = text.split_once(SCHEDULE_SEPARATOR) {
        let date = NaiveDate::parse_from_str(date_part.trim(), "%Y-%m-%d");
        let time = NaiveTime::parse_from_str(time_part.trim(), "%H:%M");
        if let (Ok(date), Ok(time)) = (date, time) {
            return Schedule {
                date,
                time: time.format("%H:%M").to_string(),
                source: ScheduleSource::Parsed,
            };
        }
    }
    Schedule {
        date: today,
        time: DEFAULT_TIME.to_string(),
        source: ScheduleSource::Fallback,
    }
}

/// Outcome of matching a requested service name against the active services.
#[derive(Debug, Clone)]
pub enum ServiceMatch<'a> {
    /// Folded name equality
    Exact(&'a Service),
    /// First service whose folded name contains a request token
    Token {
        /// The matched service
        service: &'a Service,
        /// The token that matched
        token: String,
    },
    /// Nothing matched; first active service by id
    FirstActive(&'a Service),
}

impl<'a> ServiceMatch<'a> {
    /// The matched service, whichever branch fired.
    #[must_use]
    pub fn service(&self) -> &'a Service {
        match self {
            Self::Exact(service) | Self::FirstActive(service) => service,
            Self::Token { service, .. } => service,
        }
    }
}

/// Resolve a free-text service request against the active service list.
///
/// The fallback ladder, in order: exact folded-name match, then each request
/// token against folded-name substrings (tokens in request order), then the
/// first active service. Candidates are always scanned in ascending id order
/// so ties break deterministically regardless of store iteration order.
/// Returns `None` only when `services` is empty; the caller decides what a
/// placeholder looks like. The match is lossy by design and may attach a
/// wrong but plausible service.
#[must_use]
pub fn match_service<'a>(services: &'a [Service], requested: &str) -> Option<ServiceMatch<'a>> {
    let mut ranked: Vec<&Service> = services.iter().collect();
    ranked.sort_by_key(|s| s.id);
    let first = *ranked.first()?;

    let wanted = fold(requested);
    if let Some(service) = ranked.iter().find(|s| fold(&s.name) == wanted).copied() {
        return Some(ServiceMatch::Exact(service));
    }

    for token in tokens(requested) {
        if let Some(service) = ranked.iter().find(|s| fold(&s.name).contains(&token)).copied() {
            return Some(ServiceMatch::Token { service, token });
        }
    }

    Some(ServiceMatch::FirstActive(first))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_case_and_accents() {
        assert_eq!(fold("  Micropigmentación de Cejas "), "micropigmentacion de cejas");
        assert_eq!(fold("UÑAS"), "unas");
    }

    #[test]
    fn test_tokens_drop_short_words() {
        let words = tokens("Laminado de Cejas con tinte");
        assert_eq!(words, vec!["laminado", "cejas", "tinte"]);
    }
}
