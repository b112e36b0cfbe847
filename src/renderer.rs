//! Pure mapping from a normalized itinerary to info-panel markup.
//! No network or cache access; the UI layer decides which of the loading,
//! error, or empty representations applies.

use crate::types::{NormalizedItinerary, TourOption};

/// Fixed markup for the "nothing could be generated" state. Distinct from
/// the loading and error representations below.
pub const NO_ITINERARY_HTML: &str =
    r#"<div class="itinerary-empty"><p>No itinerary available for this destination.</p></div>"#;

pub fn render_loading() -> String {
    r#"<div class="itinerary-loading"><p>Generating tour itinerary&hellip;</p></div>"#.to_string()
}

pub fn render_error() -> String {
    r#"<div class="itinerary-error"><p>Could not generate an itinerary right now. Please try again.</p></div>"#
        .to_string()
}

/// Render the itinerary for the info panel. Zero tour options yields the
/// fixed "no itinerary available" markup.
pub fn render(itinerary: &NormalizedItinerary) -> String {
    if itinerary.is_empty() {
        return NO_ITINERARY_HTML.to_string();
    }
    let mut html = String::from(r#"<div class="itinerary">"#);
    for option in &itinerary.options {
        render_option(&mut html, option);
    }
    html.push_str("</div>");
    html
}

fn render_option(html: &mut String, option: &TourOption) {
    html.push_str(r#"<div class="tour-option">"#);

    let title = if option.title.trim().is_empty() {
        &option.kind
    } else {
        &option.title
    };
    html.push_str(&format!("<h3>{}</h3>", escape(title)));
    if !option.kind.trim().is_empty() && option.kind != *title {
        html.push_str(&format!(
            r#"<span class="tour-type">{}</span>"#,
            escape(&option.kind)
        ));
    }

    if !option.details.is_empty() {
        html.push_str(r#"<ul class="tour-details">"#);
        for detail in &option.details {
            html.push_str(&format!("<li>{}</li>", escape(detail)));
        }
        html.push_str("</ul>");
    }

    if !option.overview.trim().is_empty() {
        // Overview may already carry markup produced by the prose fallback
        // (bold time markers, list items), so it is emitted as-is.
        html.push_str(&format!(
            r#"<div class="tour-overview">{}</div>"#,
            option.overview
        ));
    }

    if !option.stops.is_empty() {
        html.push_str(r#"<ol class="tour-stops">"#);
        for stop in &option.stops {
            html.push_str("<li>");
            if !stop.time.trim().is_empty() {
                html.push_str(&format!("<strong>{}</strong> ", escape(&stop.time)));
            }
            if !stop.location.trim().is_empty() {
                html.push_str(&format!("<em>{}</em>", escape(&stop.location)));
            }
            if !stop.description.trim().is_empty() {
                if !stop.location.trim().is_empty() || !stop.time.trim().is_empty() {
                    html.push_str(" &mdash; ");
                }
                html.push_str(&escape(&stop.description));
            }
            html.push_str("</li>");
        }
        html.push_str("</ol>");
    }

    if !option.highlights.is_empty() {
        html.push_str("<h4>Highlights</h4>");
        html.push_str(r#"<ul class="tour-highlights">"#);
        for highlight in &option.highlights {
            html.push_str(&format!("<li>{}</li>", escape(highlight)));
        }
        html.push_str("</ul>");
    }

    html.push_str("</div>");
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Stop, TourOption};

    fn sample() -> NormalizedItinerary {
        NormalizedItinerary::new(vec![TourOption {
            kind: "Half-day".into(),
            title: "Cliff Morning".into(),
            overview: "Temples and surf".into(),
            stops: vec![Stop {
                time: "9:00 AM".into(),
                location: "Uluwatu Temple".into(),
                description: "Clifftop walk".into(),
            }],
            highlights: vec!["Kecak dance".into()],
            details: vec!["Tour Duration: 4 hours".into()],
        }])
    }

    #[test]
    fn renders_headings_stops_and_highlights() {
        let html = render(&sample());
        assert!(html.contains("<h3>Cliff Morning</h3>"));
        assert!(html.contains(r#"<span class="tour-type">Half-day</span>"#));
        assert!(html.contains("<strong>9:00 AM</strong>"));
        assert!(html.contains("<em>Uluwatu Temple</em>"));
        assert!(html.contains("<li>Kecak dance</li>"));
        assert!(html.contains("<li>Tour Duration: 4 hours</li>"));
    }

    #[test]
    fn empty_itinerary_gets_the_fixed_markup() {
        let html = render(&NormalizedItinerary::default());
        assert_eq!(html, NO_ITINERARY_HTML);
        assert_ne!(html, render_loading());
        assert_ne!(html, render_error());
    }

    #[test]
    fn rendering_is_pure() {
        let itinerary = sample();
        assert_eq!(render(&itinerary), render(&itinerary));
    }

    #[test]
    fn model_supplied_angle_brackets_are_escaped() {
        let mut itinerary = sample();
        itinerary.options[0].title = "<script>alert(1)</script>".into();
        let html = render(&itinerary);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
