//! Unstructured fallback: scrape tour options out of free prose by splitting
//! on tour-type headings, the last resort when the model ignored the JSON
//! format request entirely.

use super::ParseStrategy;
use crate::types::TourOption;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:#+\s*|\*+\s*)?((?:half|full)[\s-]?day\s+tour.*?|option\s+\d+.*?)(?:\*+)?\s*$")
        .unwrap()
});

static DETAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[-*]\s*)?(?:\*\*)?(tour duration|start time|end time|location|group size|departure time|return time)(?:\*\*)?\s*:\s*(.+?)\s*$",
    )
    .unwrap()
});

static ITINERARY_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:#+\s*|\*+\s*)?itinerary\b").unwrap());

static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\d+[.)]\s+|[-*•]\s+)(.+?)\s*$").unwrap());

static TIME_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b\d{1,2}:\d{2}\s*(?:AM|PM)\b").unwrap());

static HALF_DAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)half[\s-]?day").unwrap());
static FULL_DAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)full[\s-]?day").unwrap());

/// One heading-delimited slice of the raw text, accumulated line by line.
struct Block {
    title: String,
    details: Vec<String>,
    paragraphs: Vec<String>,
    list_items: Vec<String>,
    has_itinerary_heading: bool,
}

impl Block {
    fn new(title: String) -> Self {
        Self {
            title,
            details: Vec::new(),
            paragraphs: Vec::new(),
            list_items: Vec::new(),
            has_itinerary_heading: false,
        }
    }

    /// A block with no recognized detail label and no explicit "Itinerary"
    /// heading is preamble or noise, not a tour option.
    fn is_accepted(&self) -> bool {
        !self.details.is_empty() || self.has_itinerary_heading
    }

    fn into_option(self) -> TourOption {
        let kind = if HALF_DAY.is_match(&self.title) {
            "Half-day".to_string()
        } else if FULL_DAY.is_match(&self.title) {
            "Full-day".to_string()
        } else {
            self.title.clone()
        };

        let mut overview = String::new();
        for paragraph in &self.paragraphs {
            if !overview.is_empty() {
                overview.push('\n');
            }
            overview.push_str(&embolden_times(paragraph));
        }
        if !self.list_items.is_empty() {
            if !overview.is_empty() {
                overview.push('\n');
            }
            overview.push_str("<ul>");
            for item in &self.list_items {
                overview.push_str("<li>");
                overview.push_str(&embolden_times(item));
                overview.push_str("</li>");
            }
            overview.push_str("</ul>");
        }

        TourOption {
            kind,
            title: self.title,
            overview,
            stops: Vec::new(),
            highlights: Vec::new(),
            details: self.details,
        }
    }
}

/// Wrap `H:MM AM/PM` markers in the body so they read as discrete bold
/// markers in the rendered overview.
fn embolden_times(line: &str) -> String {
    TIME_MARKER
        .replace_all(line, |caps: &regex::Captures| {
            format!("<strong>{}</strong>", &caps[0])
        })
        .into_owned()
}

pub struct HeadingBlockStrategy;

impl ParseStrategy for HeadingBlockStrategy {
    fn name(&self) -> &'static str {
        "heading_block"
    }

    fn parse(&self, raw: &str, _repaired: &str) -> Option<Vec<TourOption>> {
        let mut blocks: Vec<Block> = Vec::new();
        let mut current: Option<Block> = None;

        for line in raw.lines() {
            if let Some(caps) = HEADING.captures(line) {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
                current = Some(Block::new(caps[1].trim().to_string()));
                continue;
            }
            // Lines before the first heading are preamble (greetings,
            // apologies) and are discarded.
            let Some(block) = current.as_mut() else {
                continue;
            };
            if line.trim().is_empty() {
                continue;
            }
            if ITINERARY_HEADING.is_match(line) {
                block.has_itinerary_heading = true;
                continue;
            }
            if let Some(caps) = DETAIL.captures(line) {
                block.details.push(format!("{}: {}", &caps[1], &caps[2]));
                continue;
            }
            if let Some(caps) = LIST_ITEM.captures(line) {
                block.list_items.push(caps[1].to_string());
                continue;
            }
            block.paragraphs.push(line.trim().to_string());
        }
        if let Some(block) = current.take() {
            blocks.push(block);
        }

        let total = blocks.len();
        let options: Vec<TourOption> = blocks
            .into_iter()
            .filter(Block::is_accepted)
            .map(Block::into_option)
            .collect();
        debug!(
            "HeadingBlockStrategy: {} of {} blocks accepted",
            options.len(),
            total
        );
        if options.is_empty() {
            None
        } else {
            Some(options)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::Normalizer;

    #[test]
    fn greeting_is_discarded_and_details_kept() {
        let raw = "Sure! Here are two options.\n\nHalf-Day Tour\nTour Duration: 4 hours\nStart Time: 9:00 AM\n1. Visit Temple\n2. Lunch";
        let outcome = Normalizer::new().normalize(raw);
        assert_eq!(outcome.strategy, Some("heading_block"));
        let options = &outcome.itinerary.options;
        assert_eq!(options.len(), 1);
        let option = &options[0];
        assert_eq!(option.kind, "Half-day");
        assert_eq!(option.title, "Half-Day Tour");
        assert!(option.details.contains(&"Tour Duration: 4 hours".to_string()));
        assert!(option.overview.contains("<li>Visit Temple</li>"));
        assert!(option.overview.contains("<li>Lunch</li>"));
        assert!(!option.overview.contains("Sure!"));
    }

    #[test]
    fn two_headings_make_two_options() {
        let raw = "Half-Day Tour: Temples\nStart Time: 9:00 AM\nMorning at Uluwatu.\n\nFull-Day Tour: Grand Loop\nDeparture Time: 8:00 AM\nReturn Time: 7:00 PM\nA long day across the island.";
        let outcome = Normalizer::new().normalize(raw);
        let options = &outcome.itinerary.options;
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].kind, "Half-day");
        assert_eq!(options[1].kind, "Full-day");
        assert!(options[1].details.contains(&"Return Time: 7:00 PM".to_string()));
    }

    #[test]
    fn option_n_heading_is_recognized() {
        let raw = "Option 1\nLocation: Nusa Dua\nSnorkeling and lunch.\n\nOption 2\nLocation: Ubud\nRice terraces.";
        let outcome = Normalizer::new().normalize(raw);
        assert_eq!(outcome.itinerary.options.len(), 2);
        assert_eq!(outcome.itinerary.options[0].title, "Option 1");
    }

    #[test]
    fn block_without_labels_needs_an_itinerary_heading() {
        let accepted = "Half-Day Tour\nItinerary\nA relaxed morning.";
        let outcome = Normalizer::new().normalize(accepted);
        assert_eq!(outcome.itinerary.options.len(), 1);

        let rejected = "Half-Day Tour\nA relaxed morning with no structure at all.";
        let outcome = Normalizer::new().normalize(rejected);
        assert!(!outcome.recovered());
    }

    #[test]
    fn time_markers_become_bold() {
        let raw = "Full-Day Tour\nTour Duration: 10 hours\nDepart at 8:00 AM and watch the sunset at 6:15 PM.";
        let outcome = Normalizer::new().normalize(raw);
        let overview = &outcome.itinerary.options[0].overview;
        assert!(overview.contains("<strong>8:00 AM</strong>"));
        assert!(overview.contains("<strong>6:15 PM</strong>"));
    }

    #[test]
    fn markdown_decorated_headings_and_labels_parse() {
        let raw = "## Half-Day Tour\n**Start Time**: 9:00 AM\n- Beach walk\n- Coffee at a warung";
        let outcome = Normalizer::new().normalize(raw);
        let option = &outcome.itinerary.options[0];
        assert_eq!(option.title, "Half-Day Tour");
        assert!(option.details.contains(&"Start Time: 9:00 AM".to_string()));
        assert!(option.overview.contains("<li>Beach walk</li>"));
    }
}
