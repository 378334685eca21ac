//! Activity classification: keyword rules first, learned model second.
//!
//! The two stages are never blended. A rule hit always wins, even when the
//! model would have been confident about something else.

mod model;
mod rules;

pub use model::LinearModel;
pub use rules::RULES;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock, PoisonError};

const CACHE_CAPACITY: usize = 1024;

/// Semantic label assigned to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Documentation,
    Coding,
    Learning,
    Social,
    Entertainment,
    System,
    Other,
}

impl Category {
    /// All categories in declaration order, `Other` last
    pub const ALL: [Self; 7] = [
        Self::Documentation,
        Self::Coding,
        Self::Learning,
        Self::Social,
        Self::Entertainment,
        Self::System,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Documentation => "documentation",
            Self::Coding => "coding",
            Self::Learning => "learning",
            Self::Social => "social",
            Self::Entertainment => "entertainment",
            Self::System => "system",
            Self::Other => "other",
        }
    }

    /// Display colour for charts
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Documentation => "#FF6B6B",
            Self::Coding => "#D4CDC9",
            Self::Learning => "#4ECDC4",
            Self::Social => "#45B7D1",
            Self::Entertainment => "#FFA07A",
            Self::System => "#95E1D3",
            Self::Other => "#999999",
        }
    }

    /// Map a fallback model label onto a category.
    ///
    /// The model was trained with a slightly different vocabulary, so `work`
    /// and `communication` are folded into their closest category. Unknown
    /// labels give `None`.
    #[must_use]
    pub fn from_model_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "work" => Some(Self::Documentation),
            "communication" => Some(Self::Social),
            other => other.parse().ok(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(Self::as_str).collect();
                anyhow::anyhow!("Unknown category '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Where a classification came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationSource {
    /// A built-in keyword matched
    Rule,
    /// No keyword matched; the fallback model decided
    Model,
    /// Neither stage had an opinion
    Default,
}

/// Classification result with metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub source: ClassificationSource,
    /// The keyword that matched, for rule hits
    pub keyword: Option<&'static str>,
}

/// Keyword match over the combined app and title using the built-in table.
#[must_use]
pub fn match_rules(app_name: &str, window_title: &str) -> Option<(Category, &'static str)> {
    match_table(RULES, app_name, window_title)
}

/// Keyword match over the combined app and title.
///
/// Scans the lower-cased text and the original-case text for each keyword, in
/// table order. Returns the first hit.
#[must_use]
pub fn match_table<'k>(
    table: &[(Category, &[&'k str])],
    app_name: &str,
    window_title: &str,
) -> Option<(Category, &'k str)> {
    let original = format!("{app_name} {window_title}");
    let lowered = original.to_lowercase();

    table.iter().find_map(|(category, keywords)| {
        keywords
            .iter()
            .find(|keyword| lowered.contains(**keyword) || original.contains(**keyword))
            .map(|keyword| (*category, *keyword))
    })
}

/// Two-stage classifier with a lazily loaded fallback model.
///
/// A missing or broken model file leaves the classifier in rule-only mode.
pub struct Classifier {
    model_path: Option<PathBuf>,
    model: OnceLock<Option<LinearModel>>,
    cache: Mutex<LruCache<(String, String), ClassificationResult>>,
}

impl Classifier {
    /// Classifier that falls back to the model at `model_path` when given.
    #[must_use]
    pub fn new(model_path: Option<PathBuf>) -> Self {
        Self {
            model_path,
            model: OnceLock::new(),
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    /// Classifier with no fallback stage
    #[must_use]
    pub fn rules_only() -> Self {
        Self::new(None)
    }

    /// Classifier with an already loaded model
    #[must_use]
    pub fn with_model(model: LinearModel) -> Self {
        let classifier = Self::new(None);
        let _ = classifier.model.set(Some(model));
        classifier
    }

    #[must_use]
    pub fn classify(&self, app_name: &str, window_title: &str) -> Category {
        self.classify_full(app_name, window_title).category
    }

    /// Classify with full result metadata
    #[must_use]
    pub fn classify_full(&self, app_name: &str, window_title: &str) -> ClassificationResult {
        let key = (app_name.to_string(), window_title.to_string());
        if let Some(hit) = self.lock_cache().get(&key) {
            return hit.clone();
        }

        let result = self.classify_uncached(app_name, window_title);
        self.lock_cache().put(key, result.clone());
        result
    }

    fn classify_uncached(&self, app_name: &str, window_title: &str) -> ClassificationResult {
        if let Some((category, keyword)) = match_rules(app_name, window_title) {
            log::debug!("Classified '{app_name}' by keyword '{keyword}' as {category}");
            return ClassificationResult {
                category,
                source: ClassificationSource::Rule,
                keyword: Some(keyword),
            };
        }

        if let Some(category) = self
            .model()
            .and_then(|model| model.predict(app_name, window_title))
        {
            log::debug!("Classified '{app_name}' by model as {category}");
            return ClassificationResult {
                category,
                source: ClassificationSource::Model,
                keyword: None,
            };
        }

        ClassificationResult {
            category: Category::Other,
            source: ClassificationSource::Default,
            keyword: None,
        }
    }

    /// True once a model has been loaded successfully
    #[must_use]
    pub fn has_model(&self) -> bool {
        self.model().is_some()
    }

    fn model(&self) -> Option<&LinearModel> {
        self.model
            .get_or_init(|| {
                let path = self.model_path.as_ref()?;
                if !path.exists() {
                    log::info!("No classifier model at {}, using rules only", path.display());
                    return None;
                }
                match LinearModel::load(path) {
                    Ok(model) => {
                        log::info!("Loaded classifier model from {}", path.display());
                        Some(model)
                    }
                    Err(e) => {
                        log::warn!("Failed to load classifier model: {e:#}");
                        None
                    }
                }
            })
            .as_ref()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, LruCache<(String, String), ClassificationResult>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::rules_only()
    }
}

#[cfg(test)]
mod tests;
