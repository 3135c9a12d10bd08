use serde::{Deserialize, Serialize};
use std::fmt;

pub const DAYS_PER_WEEK: usize = 7;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// One of the four fixed task groupings of a week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Japanese,
    Aiml,
    College,
    Goals,
}

impl Category {
    /// Fixed display and scan order.
    pub fn all() -> &'static [Category] {
        &[
            Category::Japanese,
            Category::Aiml,
            Category::College,
            Category::Goals,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Japanese => "japanese",
            Category::Aiml => "aiml",
            Category::College => "college",
            Category::Goals => "goals",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Japanese => "Japanese Learning",
            Category::Aiml => "AI/ML Work",
            Category::College => "College Work",
            Category::Goals => "Weekly Goals",
        }
    }

    /// Prefix used in generated curriculum task ids (`w3-jp-1`).
    pub fn id_prefix(self) -> &'static str {
        match self {
            Category::Japanese => "jp",
            Category::Aiml => "ai",
            Category::College => "col",
            Category::Goals => "goal",
        }
    }

    /// Match an overlay key. Keys are compared lower-cased; anything else is
    /// an opaque key that does not belong to the fixed four.
    pub fn from_key(key: &str) -> Option<Category> {
        Category::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == key.to_lowercase())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = crate::error::StrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_key(s).ok_or_else(|| crate::error::StrideError::InvalidCategory(s.into()))
    }
}

// ---------------------------------------------------------------------------
// Day
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Day {
    pub fn all() -> &'static [Day] {
        &[
            Day::Mon,
            Day::Tue,
            Day::Wed,
            Day::Thu,
            Day::Fri,
            Day::Sat,
            Day::Sun,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Day> {
        Day::all().get(i).copied()
    }

    pub fn short(self) -> &'static str {
        match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
            Day::Sat => "Sat",
            Day::Sun => "Sun",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Day::Mon => "Monday",
            Day::Tue => "Tuesday",
            Day::Wed => "Wednesday",
            Day::Thu => "Thursday",
            Day::Fri => "Friday",
            Day::Sat => "Saturday",
            Day::Sun => "Sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short())
    }
}

impl std::str::FromStr for Day {
    type Err = crate::error::StrideError;

    /// Accepts `mon`, `monday`, or a 1-based number (`1` = Monday).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if let Ok(n) = lower.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(Day::from_index)
                .ok_or_else(|| crate::error::StrideError::InvalidDay(s.to_string()));
        }
        Day::all()
            .iter()
            .copied()
            .find(|d| d.short().to_lowercase() == lower || d.full_name().to_lowercase() == lower)
            .ok_or_else(|| crate::error::StrideError::InvalidDay(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Sakura,
    Ocean,
    Dark,
    Sunshine,
    Forest,
    Japan,
}

impl Theme {
    pub fn all() -> &'static [Theme] {
        &[
            Theme::Sakura,
            Theme::Ocean,
            Theme::Dark,
            Theme::Sunshine,
            Theme::Forest,
            Theme::Japan,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Sakura => "sakura",
            Theme::Ocean => "ocean",
            Theme::Dark => "dark",
            Theme::Sunshine => "sunshine",
            Theme::Forest => "forest",
            Theme::Japan => "japan",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Theme::Sakura => "Sakura",
            Theme::Ocean => "Ocean Blue",
            Theme::Dark => "Dark Mode",
            Theme::Sunshine => "Sunshine",
            Theme::Forest => "Forest Green",
            Theme::Japan => "Japanese Flag",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = crate::error::StrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| crate::error::StrideError::InvalidTheme(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Task / Week
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_text: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            schedule: None,
            link: None,
            link_text: None,
        }
    }

    pub fn with_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = Some(schedule.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>, text: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self.link_text = Some(text.into());
        self
    }

    /// Case-insensitive substring match against identifier or text.
    pub fn matches_fragment(&self, fragment: &str) -> bool {
        let needle = fragment.to_lowercase();
        self.id.to_lowercase().contains(&needle) || self.text.to_lowercase().contains(&needle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub week_number: u32,
    pub start_date: String,
    pub end_date: String,
    pub month: String,
    pub year: i32,
    pub phase: String,
    pub focus: String,
    #[serde(default)]
    pub japanese: Vec<Task>,
    #[serde(default)]
    pub aiml: Vec<Task>,
    #[serde(default)]
    pub college: Vec<Task>,
    #[serde(default)]
    pub goals: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
}

impl Week {
    pub fn tasks(&self, category: Category) -> &[Task] {
        match category {
            Category::Japanese => &self.japanese,
            Category::Aiml => &self.aiml,
            Category::College => &self.college,
            Category::Goals => &self.goals,
        }
    }

    pub fn tasks_mut(&mut self, category: Category) -> &mut Vec<Task> {
        match category {
            Category::Japanese => &mut self.japanese,
            Category::Aiml => &mut self.aiml,
            Category::College => &mut self.college,
            Category::Goals => &mut self.goals,
        }
    }

    /// Every task in fixed category order.
    pub fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        Category::all().iter().flat_map(move |c| self.tasks(*c).iter())
    }

    pub fn task_count(&self) -> usize {
        Category::all().iter().map(|c| self.tasks(*c).len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekNotes {
    #[serde(default)]
    pub went_well: String,
    #[serde(default)]
    pub challenges: String,
    #[serde(default)]
    pub improvements: String,
}

impl WeekNotes {
    pub fn is_empty(&self) -> bool {
        self.went_well.trim().is_empty()
            && self.challenges.trim().is_empty()
            && self.improvements.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
