use crate::error::{ExplorerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Bounding box destinations are expected to fall inside (WGS84 degrees).
/// Records outside it are kept but flagged at load time.
pub const BALI_LON_RANGE: (f64, f64) = (114.3, 116.0);
pub const BALI_LAT_RANGE: (f64, f64) = (-9.3, -8.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Featured,
    Beaches,
    BeachClubs,
    WaterSports,
    Cultural,
    CulturalExperiences,
    TraditionalVillages,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Featured,
        Category::Beaches,
        Category::BeachClubs,
        Category::WaterSports,
        Category::Cultural,
        Category::CulturalExperiences,
        Category::TraditionalVillages,
    ];

    /// Display name used by the sidebar and info panel.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Featured => "Featured Attraction",
            Category::Beaches => "Beach",
            Category::BeachClubs => "Beach Club",
            Category::WaterSports => "Water Sports",
            Category::Cultural => "Cultural Site",
            Category::CulturalExperiences => "Cultural Experience",
            Category::TraditionalVillages => "Traditional Village",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Category::Featured => "featured",
            Category::Beaches => "beaches",
            Category::BeachClubs => "beach-clubs",
            Category::WaterSports => "water-sports",
            Category::Cultural => "cultural",
            Category::CulturalExperiences => "cultural-experiences",
            Category::TraditionalVillages => "traditional-villages",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Category::ALL.iter().copied().find(|c| c.slug() == slug)
    }
}

/// One tourist destination record. Read-only after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub category: Category,
    /// (longitude, latitude), WGS84 degrees.
    pub coordinates: (f64, f64),
    pub description: String,
    pub driving_time: String,
    pub distance: String,
    /// In-category ordering; lower sorts first.
    pub priority: u32,
}

impl Destination {
    pub fn in_bali_bounds(&self) -> bool {
        let (lon, lat) = self.coordinates;
        lon >= BALI_LON_RANGE.0
            && lon <= BALI_LON_RANGE.1
            && lat >= BALI_LAT_RANGE.0
            && lat <= BALI_LAT_RANGE.1
    }
}

/// The static destination catalog, validated at load.
#[derive(Debug)]
pub struct Catalog {
    destinations: Vec<Destination>,
}

/// Dataset distilled from the original widget's destination file.
const DESTINATIONS_JSON: &str = include_str!("../data/destinations.json");

impl Catalog {
    /// Load the embedded dataset. Duplicate ids are a hard error;
    /// out-of-bounds coordinates are a warning only.
    pub fn load() -> Result<Self> {
        Self::from_json(DESTINATIONS_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let destinations: Vec<Destination> = serde_json::from_str(json)?;

        let mut seen = HashSet::new();
        for destination in &destinations {
            if !seen.insert(destination.id.as_str()) {
                return Err(ExplorerError::Catalog(format!(
                    "duplicate destination id '{}'",
                    destination.id
                )));
            }
            if !destination.in_bali_bounds() {
                warn!(
                    id = %destination.id,
                    lon = destination.coordinates.0,
                    lat = destination.coordinates.1,
                    "Destination coordinates fall outside the Bali bounding box"
                );
            }
        }

        debug!("Loaded {} destinations", destinations.len());
        Ok(Self { destinations })
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Destination> {
        self.destinations.iter().find(|d| d.id == id)
    }

    /// All destinations in one category, ordered by priority.
    pub fn by_category(&self, category: Category) -> Vec<&Destination> {
        let mut matches: Vec<&Destination> = self
            .destinations
            .iter()
            .filter(|d| d.category == category)
            .collect();
        matches.sort_by_key(|d| d.priority);
        matches
    }

    /// Case-insensitive substring search on destination names,
    /// mirroring the sidebar search box.
    pub fn search(&self, query: &str) -> Vec<&Destination> {
        let query = query.to_lowercase();
        let query = query.trim();
        if query.is_empty() {
            return self.destinations.iter().collect();
        }
        self.destinations
            .iter()
            .filter(|d| d.name.to_lowercase().contains(query))
            .collect()
    }
}
