use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// The resolved location for one itinerary request. Immutable for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistrictContext {
    pub district_id: i64,
    pub district_name: String,
    pub region_id: i64,
    pub region_name: String,
    pub country_id: i64,
    pub country_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centroid: Option<Coordinates>,
}

impl DistrictContext {
    /// "District, Region, Country" for prompts and search queries.
    pub fn display_path(&self) -> String {
        format!(
            "{}, {}, {}",
            self.district_name, self.region_name, self.country_name
        )
    }
}

/// Where to draw the random district from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionScope {
    Region(i64),
    Country(i64),
}

impl fmt::Display for RegionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionScope::Region(id) => write!(f, "region {}", id),
            RegionScope::Country(id) => write!(f, "country {}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "zh-TW")]
    ZhTw,
    #[serde(rename = "en")]
    En,
    #[serde(rename = "ja")]
    Ja,
    #[serde(rename = "ko")]
    Ko,
}

impl Language {
    /// Name used when asking the AI service to answer in this language.
    pub fn prompt_name(&self) -> &'static str {
        match self {
            Language::ZhTw => "Traditional Chinese (Taiwan)",
            Language::En => "English",
            Language::Ja => "Japanese",
            Language::Ko => "Korean",
        }
    }

    pub fn shortage_message(&self, found: usize, requested: usize, district: &str) -> String {
        match self {
            Language::ZhTw => format!(
                "{}目前只找到 {} 個景點（目標 {} 個），請稍後再試或換個地區。",
                district, found, requested
            ),
            Language::En => format!(
                "Only {} of {} places could be found in {}. Try again later or pick another area.",
                found, requested, district
            ),
            Language::Ja => format!(
                "{}では{}件中{}件のスポットしか見つかりませんでした。",
                district, requested, found
            ),
            Language::Ko => format!(
                "{}에서 {}곳 중 {}곳만 찾았습니다.",
                district, requested, found
            ),
        }
    }
}
