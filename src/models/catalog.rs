//! Fixed POI taxonomy: macro-categories, their subcategories, energy levels and
//! the time windows a subcategory is sensible in.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroCategory {
    Food,
    Stay,
    Education,
    Experience,
    Entertainment,
    Activity,
    Scenery,
    Shopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
}

/// When a subcategory makes sense to visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Anytime,
    Daytime,
    Nighttime,
}

#[derive(Debug, Clone, Copy)]
pub struct Subcategory {
    pub name: &'static str,
    pub window: Window,
}

const fn any(name: &'static str) -> Subcategory {
    Subcategory { name, window: Window::Anytime }
}

const fn day(name: &'static str) -> Subcategory {
    Subcategory { name, window: Window::Daytime }
}

const fn night(name: &'static str) -> Subcategory {
    Subcategory { name, window: Window::Nighttime }
}

pub const BREAKFAST_SUBCATEGORIES: &[Subcategory] = &[
    day("breakfast shop"),
    day("brunch cafe"),
    day("soy milk shop"),
    day("bakery"),
];

pub const MEAL_SUBCATEGORIES: &[Subcategory] = &[
    any("local diner"),
    any("noodle shop"),
    any("hot pot"),
    any("seafood restaurant"),
    any("vegetarian restaurant"),
    any("dumpling house"),
];

const STAY_SUBCATEGORIES: &[Subcategory] = &[
    any("hotel"),
    any("homestay"),
    any("hostel"),
    any("hot spring inn"),
];

const EDUCATION_SUBCATEGORIES: &[Subcategory] = &[
    day("museum"),
    day("art gallery"),
    any("historic site"),
    day("library"),
    day("science center"),
];

const EXPERIENCE_SUBCATEGORIES: &[Subcategory] = &[
    day("diy workshop"),
    day("cooking class"),
    any("tea house"),
    day("farm experience"),
    any("hot spring"),
];

const ENTERTAINMENT_SUBCATEGORIES: &[Subcategory] = &[
    night("bar"),
    night("karaoke"),
    night("live house"),
    any("cinema"),
    any("arcade"),
    any("board game cafe"),
];

const ACTIVITY_SUBCATEGORIES: &[Subcategory] = &[
    day("hiking trail"),
    day("bike path"),
    day("water sports"),
    any("climbing gym"),
    day("amusement park"),
];

const SCENERY_SUBCATEGORIES: &[Subcategory] = &[
    any("temple"),
    any("park"),
    any("viewpoint"),
    any("old street"),
    day("beach"),
    day("waterfall"),
];

const SHOPPING_SUBCATEGORIES: &[Subcategory] = &[
    night("night market"),
    any("department store"),
    any("souvenir shop"),
    day("traditional market"),
    any("bookstore"),
];

impl MacroCategory {
    pub const ALL: [MacroCategory; 8] = [
        MacroCategory::Food,
        MacroCategory::Stay,
        MacroCategory::Education,
        MacroCategory::Experience,
        MacroCategory::Entertainment,
        MacroCategory::Activity,
        MacroCategory::Scenery,
        MacroCategory::Shopping,
    ];

    /// Categories that fill the non-food, non-stay part of an itinerary.
    pub const ACTIVITY_POOL: [MacroCategory; 6] = [
        MacroCategory::Education,
        MacroCategory::Experience,
        MacroCategory::Entertainment,
        MacroCategory::Activity,
        MacroCategory::Scenery,
        MacroCategory::Shopping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MacroCategory::Food => "food",
            MacroCategory::Stay => "stay",
            MacroCategory::Education => "education",
            MacroCategory::Experience => "experience",
            MacroCategory::Entertainment => "entertainment",
            MacroCategory::Activity => "activity",
            MacroCategory::Scenery => "scenery",
            MacroCategory::Shopping => "shopping",
        }
    }

    pub fn energy(&self) -> EnergyLevel {
        match self {
            MacroCategory::Education
            | MacroCategory::Experience
            | MacroCategory::Activity
            | MacroCategory::Scenery => EnergyLevel::High,
            MacroCategory::Entertainment => EnergyLevel::Medium,
            MacroCategory::Food | MacroCategory::Shopping | MacroCategory::Stay => EnergyLevel::Low,
        }
    }

    /// Subcategories of this macro-category. Food lists meal subcategories;
    /// breakfast ones live in [`BREAKFAST_SUBCATEGORIES`].
    pub fn subcategories(&self) -> &'static [Subcategory] {
        match self {
            MacroCategory::Food => MEAL_SUBCATEGORIES,
            MacroCategory::Stay => STAY_SUBCATEGORIES,
            MacroCategory::Education => EDUCATION_SUBCATEGORIES,
            MacroCategory::Experience => EXPERIENCE_SUBCATEGORIES,
            MacroCategory::Entertainment => ENTERTAINMENT_SUBCATEGORIES,
            MacroCategory::Activity => ACTIVITY_SUBCATEGORIES,
            MacroCategory::Scenery => SCENERY_SUBCATEGORIES,
            MacroCategory::Shopping => SHOPPING_SUBCATEGORIES,
        }
    }

    pub fn color_tag(&self) -> &'static str {
        match self {
            MacroCategory::Food => "#F4A261",
            MacroCategory::Stay => "#6D597A",
            MacroCategory::Education => "#457B9D",
            MacroCategory::Experience => "#2A9D8F",
            MacroCategory::Entertainment => "#E76F51",
            MacroCategory::Activity => "#8AB17D",
            MacroCategory::Scenery => "#52B788",
            MacroCategory::Shopping => "#E9C46A",
        }
    }
}

impl fmt::Display for MacroCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Looks up which activity-pool macro-category owns a subcategory name.
pub fn macro_category_of(subcategory: &str) -> Option<MacroCategory> {
    MacroCategory::ALL
        .iter()
        .copied()
        .find(|category| category.subcategories().iter().any(|s| s.name == subcategory))
        .or_else(|| {
            BREAKFAST_SUBCATEGORIES
                .iter()
                .any(|s| s.name == subcategory)
                .then_some(MacroCategory::Food)
        })
}
