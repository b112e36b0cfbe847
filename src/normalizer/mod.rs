//! Best-effort conversion of raw model text into structured tour data.
//!
//! The model output format is not contractually guaranteed, so normalization
//! is an ordered chain of increasingly lenient strategies: repaired-JSON
//! bracket-span extraction, whole-text JSON parse, then a heading-based prose
//! scrape. The chain stops at the first strategy that recovers at least one
//! usable tour option; malformed input never raises an error here.

mod heading;

pub use heading::HeadingBlockStrategy;

use crate::types::{NormalizedItinerary, TourOption};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// Result of a normalization pass. `strategy` names the strategy that
/// recovered the options; `None` means the response was unparseable and
/// `itinerary` is empty.
#[derive(Debug, Clone)]
pub struct NormalizeOutcome {
    pub itinerary: NormalizedItinerary,
    pub strategy: Option<&'static str>,
}

impl NormalizeOutcome {
    pub fn recovered(&self) -> bool {
        self.strategy.is_some()
    }

    fn unparseable() -> Self {
        Self {
            itinerary: NormalizedItinerary::default(),
            strategy: None,
        }
    }
}

/// One named parsing strategy. `raw` is the untouched model text, `repaired`
/// the output of the trailing-comma/bracket repair pass; each strategy picks
/// the form it needs.
pub trait ParseStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn parse(&self, raw: &str, repaired: &str) -> Option<Vec<TourOption>>;
}

static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*([}\]])").unwrap());
static OPENS_ARRAY_OF_OBJECTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\[\s*\{").unwrap());

/// Fix the two malformed-JSON artifacts generative output produces most:
/// trailing commas before a closing brace/bracket, and an array of objects
/// that was opened but never closed.
pub fn repair(raw: &str) -> String {
    let mut repaired = TRAILING_COMMA.replace_all(raw, "$1").into_owned();
    if OPENS_ARRAY_OF_OBJECTS.is_match(&repaired) && !repaired.trim_end().ends_with(']') {
        repaired.push(']');
    }
    repaired
}

/// Keep an option when it has stops, or enough text to display without them.
fn keep_usable(options: Vec<TourOption>) -> Option<Vec<TourOption>> {
    let kept: Vec<TourOption> = options
        .into_iter()
        .filter(|o| !o.stops.is_empty() || o.is_displayable())
        .collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept)
    }
}

fn options_from_array(values: &[serde_json::Value]) -> Vec<TourOption> {
    values
        .iter()
        .filter_map(|value| match serde_json::from_value::<TourOption>(value.clone()) {
            Ok(option) => Some(option),
            Err(e) => {
                warn!("Skipping array element that is not a tour option: {}", e);
                None
            }
        })
        .collect()
}

fn bracket_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

/// Greedy first-`[`-to-last-`]` span of the repaired text, parsed strictly.
/// An empty-but-valid array is rejected so the prose fallback still runs.
pub struct JsonArrayStrategy;

impl ParseStrategy for JsonArrayStrategy {
    fn name(&self) -> &'static str {
        "json_array"
    }

    fn parse(&self, _raw: &str, repaired: &str) -> Option<Vec<TourOption>> {
        let span = bracket_span(repaired)?;
        let value: serde_json::Value = serde_json::from_str(span).ok()?;
        let array = value.as_array()?;
        if array.is_empty() {
            debug!("JsonArrayStrategy: span parsed to an empty array, falling through");
            return None;
        }
        keep_usable(options_from_array(array))
    }
}

/// Whole-text JSON parse, attempted only when no bracket span exists
/// (the model returned exactly the payload with no wrapper prose).
pub struct DirectJsonStrategy;

impl ParseStrategy for DirectJsonStrategy {
    fn name(&self) -> &'static str {
        "direct_json"
    }

    fn parse(&self, _raw: &str, repaired: &str) -> Option<Vec<TourOption>> {
        if bracket_span(repaired).is_some() {
            // JsonArrayStrategy already owned this input.
            return None;
        }
        let value: serde_json::Value = serde_json::from_str(repaired).ok()?;
        let array = value.as_array()?;
        if array.is_empty() {
            return None;
        }
        keep_usable(options_from_array(array))
    }
}

/// The strictly-ordered strategy chain.
pub struct Normalizer {
    strategies: Vec<Box<dyn ParseStrategy>>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(JsonArrayStrategy),
                Box::new(DirectJsonStrategy),
                Box::new(HeadingBlockStrategy),
            ],
        }
    }

    /// Deterministic fold over the strategy chain, stopping at the first
    /// strategy that yields at least one usable tour option. Always returns
    /// an outcome; the empty outcome is the unparseable signal.
    pub fn normalize(&self, raw: &str) -> NormalizeOutcome {
        if raw.trim().is_empty() {
            return NormalizeOutcome::unparseable();
        }
        let repaired = repair(raw);
        for strategy in &self.strategies {
            if let Some(options) = strategy.parse(raw, &repaired) {
                debug!(
                    strategy = strategy.name(),
                    options = options.len(),
                    "Recovered tour options"
                );
                return NormalizeOutcome {
                    itinerary: NormalizedItinerary::new(options),
                    strategy: Some(strategy.name()),
                };
            }
        }
        debug!("No strategy recovered any tour options");
        NormalizeOutcome::unparseable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stop;

    #[test]
    fn repair_strips_trailing_commas() {
        let fixed = repair(r#"[{"title":"A",},]"#);
        assert_eq!(fixed, r#"[{"title":"A"}]"#);
    }

    #[test]
    fn repair_closes_unterminated_array() {
        let fixed = repair(r#"[{"title":"A"}"#);
        assert!(fixed.ends_with(']'));
        // but leaves non-array text alone
        assert_eq!(repair("just prose ["), "just prose [");
    }

    #[test]
    fn trailing_comma_vector_parses_to_one_option() {
        let raw = r#"[{"type":"Half-day","title":"A","overview":"x","stops":[{"time":"9am","location":"L","description":"d"},],"highlights":[]}]"#;
        let outcome = Normalizer::new().normalize(raw);
        assert_eq!(outcome.strategy, Some("json_array"));
        let options = &outcome.itinerary.options;
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].title, "A");
        assert_eq!(
            options[0].stops,
            vec![Stop {
                time: "9am".into(),
                location: "L".into(),
                description: "d".into(),
            }]
        );
    }

    #[test]
    fn json_round_trip_is_field_for_field() {
        let original = vec![
            TourOption {
                kind: "Half-day".into(),
                title: "Cliff Morning".into(),
                overview: "Temples and surf".into(),
                stops: vec![Stop {
                    time: "9:00 AM".into(),
                    location: "Uluwatu Temple".into(),
                    description: "Clifftop walk".into(),
                }],
                highlights: vec!["Kecak dance".into()],
                details: vec![],
            },
            TourOption {
                kind: "Full-day".into(),
                title: "Island Loop".into(),
                overview: "North and back".into(),
                stops: vec![],
                highlights: vec![],
                details: vec![],
            },
        ];
        let raw = serde_json::to_string(&original).unwrap();
        let outcome = Normalizer::new().normalize(&raw);
        assert!(outcome.recovered());
        assert_eq!(outcome.itinerary.options, original);
    }

    #[test]
    fn wrapper_prose_around_array_is_ignored() {
        let raw = format!(
            "Here you go!\n\n{}\n\nEnjoy your trip.",
            r#"[{"type":"Half-day","title":"A","overview":"x","stops":[],"highlights":[]}]"#
        );
        let outcome = Normalizer::new().normalize(&raw);
        assert_eq!(outcome.strategy, Some("json_array"));
        assert_eq!(outcome.itinerary.options[0].title, "A");
    }

    #[test]
    fn empty_json_array_falls_through_to_unparseable() {
        let outcome = Normalizer::new().normalize("[]");
        assert!(!outcome.recovered());
        assert!(outcome.itinerary.is_empty());
    }

    #[test]
    fn prose_refusal_is_unparseable_not_a_panic() {
        let outcome = Normalizer::new().normalize("I cannot help with that request.");
        assert!(!outcome.recovered());
        assert!(outcome.itinerary.is_empty());
    }

    #[test]
    fn empty_input_is_unparseable() {
        let outcome = Normalizer::new().normalize("   \n ");
        assert!(!outcome.recovered());
    }

    #[test]
    fn normalization_is_deterministic() {
        let raw = "Sure! Here are two options.\n\nHalf-Day Tour\nTour Duration: 4 hours\nStart Time: 9:00 AM\n1. Visit Temple\n2. Lunch";
        let normalizer = Normalizer::new();
        let first = normalizer.normalize(raw);
        let second = normalizer.normalize(raw);
        assert_eq!(first.itinerary, second.itinerary);
        assert_eq!(first.strategy, second.strategy);
    }

    #[test]
    fn option_without_stops_but_with_overview_is_kept() {
        let raw = r#"[{"type":"Half-day","title":"","overview":"Just relax on the beach","stops":[],"highlights":[]}]"#;
        let outcome = Normalizer::new().normalize(raw);
        assert_eq!(outcome.itinerary.options.len(), 1);
    }

    #[test]
    fn option_with_no_text_and_no_stops_is_dropped() {
        let raw = r#"[{"type":"Half-day","title":"","overview":"","stops":[],"highlights":[]}]"#;
        let outcome = Normalizer::new().normalize(raw);
        assert!(!outcome.recovered());
    }
}
