use serde::{Deserialize, Serialize};

use crate::catalog::Destination;

/// The unprocessed content field returned by the model call.
/// May be valid JSON, JSON with trailing commas or unbalanced brackets,
/// or unstructured prose; the normalizer decides.
pub type RawModelResponse = String;

/// One waypoint within a tour option. All fields are free text as given by
/// the model; `time` is never parsed into a machine time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
}

/// One complete half-day/full-day itinerary proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourOption {
    /// "Half-day" or "Full-day" by convention; free text tolerated.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    /// Stops in chronological order as given by the source; never re-sorted.
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub highlights: Vec<String>,
    /// Recognized detail lines ("Tour Duration: 4 hours") recovered by the
    /// prose fallback. Absent from well-formed JSON input, so skipped when
    /// empty to keep round-trips field-for-field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl TourOption {
    /// An option with zero stops is still worth displaying if it carries
    /// a title or an overview.
    pub fn is_displayable(&self) -> bool {
        !self.title.trim().is_empty() || !self.overview.trim().is_empty()
    }
}

/// Ordered sequence of tour options. Zero options signals "unparseable",
/// a distinct terminal state from an absent cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NormalizedItinerary {
    pub options: Vec<TourOption>,
}

impl NormalizedItinerary {
    pub fn new(options: Vec<TourOption>) -> Self {
        Self { options }
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Transient per-selection value: the prompt sent to the model proxy.
/// Created per user selection; not persisted.
#[derive(Debug, Clone)]
pub struct ItineraryRequest {
    pub destination_id: String,
    pub destination_name: String,
    pub prompt: String,
}

impl ItineraryRequest {
    pub fn for_destination(destination: &Destination) -> Self {
        let prompt = format!(
            "You are a Bali travel planner. Create exactly two tour itinerary options for a \
             visitor staying near {name} ({description}). The first option must be a Half-day \
             tour and the second a Full-day tour. Respond with ONLY a JSON array of two \
             objects, each shaped as {{\"type\": \"Half-day\" or \"Full-day\", \"title\": string, \
             \"overview\": string, \"stops\": [{{\"time\": string, \"location\": string, \
             \"description\": string}}], \"highlights\": [string]}}. Keep stops in \
             chronological order and do not add commentary outside the JSON array.",
            name = destination.name,
            description = destination.description,
        );
        Self {
            destination_id: destination.id.clone(),
            destination_name: destination.name.clone(),
            prompt,
        }
    }
}
