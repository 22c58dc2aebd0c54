//! Immutable day catalog and category table for a single itinerary.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

/// Stable identity of a day. Never reused and independent of array position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayNumber(pub u32);

impl DayNumber {
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for DayNumber {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for DayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a quota category. Surrounding whitespace is trimmed whether
/// the id comes from code or from JSON.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CategoryId(pub String);

impl CategoryId {
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CategoryId {
    fn from(value: String) -> Self {
        if value.trim().len() == value.len() {
            Self(value)
        } else {
            Self::new(&value)
        }
    }
}

impl From<CategoryId> for String {
    fn from(value: CategoryId) -> Self {
        value.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Grading shown on day cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
    Expert,
}

/// One selectable unit of the itinerary.
///
/// Only `day_number`, `category_id` and `date` are read by the engine; the
/// remaining fields are display payload carried for collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub day_number: DayNumber,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub distance_km: Option<f32>,
    #[serde(default)]
    pub elevation_gain_m: Option<u32>,
    #[serde(default)]
    pub elevation_loss_m: Option<u32>,
}

impl Day {
    /// Create a bare day with no category, date, or display payload.
    #[must_use]
    pub fn new(day_number: u32) -> Self {
        Self {
            day_number: DayNumber(day_number),
            category_id: None,
            date: None,
            title: String::new(),
            difficulty: None,
            distance_km: None,
            elevation_gain_m: None,
            elevation_loss_m: None,
        }
    }

    #[must_use]
    pub fn in_category(mut self, category: &str) -> Self {
        self.category_id = Some(CategoryId::new(category));
        self
    }

    #[must_use]
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn titled(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }
}

/// Grouping of days used for quota accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(default)]
    pub name: Option<String>,
    /// Absent when the category carries no quota.
    #[serde(default)]
    pub max_selectable_days: Option<u32>,
}

impl Category {
    #[must_use]
    pub fn unbounded(id: &str) -> Self {
        Self {
            id: CategoryId::new(id),
            name: None,
            max_selectable_days: None,
        }
    }

    #[must_use]
    pub fn with_quota(id: &str, max_selectable_days: u32) -> Self {
        Self {
            id: CategoryId::new(id),
            name: None,
            max_selectable_days: Some(max_selectable_days),
        }
    }
}

/// Errors raised while assembling a catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("day {0} appears more than once in the itinerary")]
    DuplicateDay(DayNumber),
    #[error("category {0} is declared more than once")]
    DuplicateCategory(CategoryId),
    #[error("day {day} references undeclared category {category}")]
    UnknownCategory { day: DayNumber, category: CategoryId },
}

/// Immutable lookup of days by stable identifier.
///
/// Days keep the order in which they were supplied ("catalog order"), which
/// is the tie-break used by canonical ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrekDayCatalog {
    days: Vec<Day>,
    positions: HashMap<DayNumber, usize>,
    categories: BTreeMap<CategoryId, Category>,
}

impl TrekDayCatalog {
    /// Build a catalog from day records and category declarations.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when a day number or category id is repeated,
    /// or when a day references a category that was not declared.
    pub fn new(days: Vec<Day>, categories: Vec<Category>) -> Result<Self, CatalogError> {
        let mut category_map = BTreeMap::new();
        for category in categories {
            if category_map.contains_key(&category.id) {
                return Err(CatalogError::DuplicateCategory(category.id));
            }
            category_map.insert(category.id.clone(), category);
        }

        let mut positions = HashMap::with_capacity(days.len());
        for (idx, day) in days.iter().enumerate() {
            if positions.insert(day.day_number, idx).is_some() {
                return Err(CatalogError::DuplicateDay(day.day_number));
            }
            if let Some(category) = &day.category_id
                && !category_map.contains_key(category)
            {
                return Err(CatalogError::UnknownCategory {
                    day: day.day_number,
                    category: category.clone(),
                });
            }
        }

        Ok(Self {
            days,
            positions,
            categories: category_map,
        })
    }

    #[must_use]
    pub fn get(&self, day: DayNumber) -> Option<&Day> {
        self.positions.get(&day).map(|&idx| &self.days[idx])
    }

    #[must_use]
    pub fn contains(&self, day: DayNumber) -> bool {
        self.positions.contains_key(&day)
    }

    /// Index of the day in catalog order.
    #[must_use]
    pub fn position(&self, day: DayNumber) -> Option<usize> {
        self.positions.get(&day).copied()
    }

    #[must_use]
    pub fn category_of(&self, day: DayNumber) -> Option<&CategoryId> {
        self.get(day).and_then(|d| d.category_id.as_ref())
    }

    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.get(id)
    }

    /// Categories in ascending id order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    /// Days in catalog order.
    #[must_use]
    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn day_numbers(&self) -> impl Iterator<Item = DayNumber> + '_ {
        self.days.iter().map(|d| d.day_number)
    }

    pub fn days_in_category<'a>(&'a self, id: &'a CategoryId) -> impl Iterator<Item = &'a Day> {
        self.days
            .iter()
            .filter(move |d| d.category_id.as_ref() == Some(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
