use crate::models::catalog::{EnergyLevel, MacroCategory, Window};
use serde::{Deserialize, Serialize};

/// Canonical suggested times, in day order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Breakfast,
    Morning,
    Lunch,
    Afternoon,
    TeaTime,
    Dinner,
    Evening,
    Night,
    LateNight,
    Overnight,
}

impl TimeSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Breakfast => "breakfast",
            TimeSlot::Morning => "morning",
            TimeSlot::Lunch => "lunch",
            TimeSlot::Afternoon => "afternoon",
            TimeSlot::TeaTime => "tea_time",
            TimeSlot::Dinner => "dinner",
            TimeSlot::Evening => "evening",
            TimeSlot::Night => "night",
            TimeSlot::LateNight => "late_night",
            TimeSlot::Overnight => "overnight",
        }
    }
}

/// Independent resolution units. Declaration order is the merge priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl WorkerKind {
    pub const ORDER: [WorkerKind; 4] = [
        WorkerKind::Morning,
        WorkerKind::Afternoon,
        WorkerKind::Evening,
        WorkerKind::Night,
    ];

    /// Whether a subcategory with `window` is appropriate for this worker.
    pub fn allows(&self, window: Window) -> bool {
        match (self, window) {
            (_, Window::Anytime) => true,
            (WorkerKind::Morning | WorkerKind::Afternoon, Window::Daytime) => true,
            (WorkerKind::Morning | WorkerKind::Afternoon, Window::Nighttime) => false,
            (WorkerKind::Evening, _) => true,
            (WorkerKind::Night, Window::Daytime) => false,
            (WorkerKind::Night, Window::Nighttime) => true,
        }
    }
}

/// A planned requirement for one POI, before resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub macro_category: MacroCategory,
    pub subcategory: Option<String>,
    pub time_slot: TimeSlot,
    pub energy: EnergyLevel,
    pub worker: WorkerKind,
}

impl Slot {
    pub fn new(macro_category: MacroCategory, time_slot: TimeSlot, worker: WorkerKind) -> Self {
        Self {
            macro_category,
            subcategory: None,
            time_slot,
            energy: macro_category.energy(),
            worker,
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    /// Breakfast/lunch/dinner and stay slots have a fixed kind; everything
    /// else is an open activity slot.
    pub fn is_fixed(&self) -> bool {
        matches!(self.macro_category, MacroCategory::Food | MacroCategory::Stay)
    }
}
