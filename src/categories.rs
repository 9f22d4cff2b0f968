//! Fixed category table
//!
//! Every source consults this table to decide what to request, and the merge
//! walks it to decide output order. It is passed around explicitly so tests
//! can substitute smaller tables.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

/// Source-specific query descriptor for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDescriptor {
    pub name: String,
    /// Playlist `group-title` values folded into this category
    pub playlist_groups: Vec<String>,
    /// Video search query
    pub search_query: String,
    /// Metadata API genre id
    pub genre_id: u32,
}

impl CategoryDescriptor {
    pub fn new(name: &str, playlist_groups: &[&str], search_query: &str, genre_id: u32) -> Self {
        Self {
            name: name.to_string(),
            playlist_groups: playlist_groups.iter().map(|g| g.to_string()).collect(),
            search_query: search_query.to_string(),
            genre_id,
        }
    }
}

// name, playlist groups, search query, genre id
const STANDARD_CATEGORIES: &[(&str, &[&str], &str, u32)] = &[
    ("news", &["News", "General"], "live news 24/7", 10763),
    ("sports", &["Sports"], "sports highlights", 10759),
    ("movies", &["Movies", "Classic"], "full length free movie", 18),
    ("music", &["Music"], "live music concert", 10767),
    ("kids", &["Kids", "Animation", "Family"], "kids cartoons full episodes", 10762),
    ("documentary", &["Documentary"], "full documentary", 99),
    ("technology", &["Science"], "technology news review", 10765),
    ("science", &["Science"], "science explained", 99),
    ("education", &["Education"], "educational lecture", 99),
    ("entertainment", &["Entertainment", "General"], "entertainment news", 10764),
    ("comedy", &["Comedy"], "stand up comedy special", 35),
    ("lifestyle", &["Lifestyle", "Outdoor"], "lifestyle vlog", 10764),
    ("cooking", &["Cooking"], "cooking recipes", 10764),
    ("travel", &["Travel", "Culture"], "travel documentary", 99),
    ("business", &["Business"], "business news live", 10763),
    ("religion", &["Religious"], "worship service live", 18),
];

/// Immutable ordered set of category descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    categories: Vec<CategoryDescriptor>,
}

impl CategoryTable {
    pub fn new(categories: Vec<CategoryDescriptor>) -> Self {
        Self { categories }
    }

    /// The 16 categories the client knows about. Names must never change.
    pub fn standard() -> Self {
        Self::new(
            STANDARD_CATEGORIES
                .iter()
                .map(|(name, groups, query, genre)| {
                    CategoryDescriptor::new(name, groups, query, *genre)
                })
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Result<&CategoryDescriptor, CategoryError> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CategoryError::UnknownCategory(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryDescriptor> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'a> IntoIterator for &'a CategoryTable {
    type Item = &'a CategoryDescriptor;
    type IntoIter = std::slice::Iter<'a, CategoryDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}
