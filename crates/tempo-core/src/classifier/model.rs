//! Probabilistic fallback: a linear bag-of-tokens model stored as JSON.
//!
//! ```json
//! {
//!   "labels": ["coding", "entertainment", "work"],
//!   "bias": [0.1, -0.2, 0.0],
//!   "weights": { "vim": [2.3, -0.4, 0.1], "剧": [-0.5, 1.9, 0.0] },
//!   "min_score": 0.4
//! }
//! ```
//!
//! A prediction is the softmax argmax over `bias + sum(weights[token])`. It is
//! dropped when its probability is below `min_score`, when no token is known,
//! or when its label does not map onto a [`Category`].

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::Category;

#[derive(Debug, Deserialize)]
struct ModelFile {
    labels: Vec<String>,
    bias: Vec<f64>,
    weights: HashMap<String, Vec<f64>>,
    #[serde(default)]
    min_score: f64,
}

#[derive(Debug)]
pub struct LinearModel {
    labels: Vec<Option<Category>>,
    bias: Vec<f64>,
    weights: HashMap<String, Vec<f64>>,
    min_score: f64,
    tokenizer: Regex,
}

impl LinearModel {
    /// Load and validate a model file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a weight
    /// vector does not have one entry per label.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model {}", path.display()))?;
        Self::from_json(&raw)
    }

    /// Parse and validate a model from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, the dimensions disagree, or a
    /// number is not finite.
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: ModelFile = serde_json::from_str(raw).context("Failed to parse model")?;

        let width = file.labels.len();
        if width == 0 {
            bail!("Model has no labels");
        }
        if file.bias.len() != width {
            bail!("Model bias has {} entries for {width} labels", file.bias.len());
        }
        if let Some((token, row)) = file.weights.iter().find(|(_, row)| row.len() != width) {
            bail!("Weights for {token:?} have {} entries for {width} labels", row.len());
        }
        if !file.bias.iter().all(|b| b.is_finite()) || !file.min_score.is_finite() {
            bail!("Model bias and min_score must be finite");
        }
        if let Some((token, _)) = file
            .weights
            .iter()
            .find(|(_, row)| !row.iter().all(|w| w.is_finite()))
        {
            bail!("Weights for {token:?} are not finite");
        }

        let labels = file
            .labels
            .iter()
            .map(|label| {
                let category = Category::from_model_label(label);
                if category.is_none() {
                    log::warn!("Model label {label:?} has no category and will be ignored");
                }
                category
            })
            .collect();

        Ok(Self {
            labels,
            bias: file.bias,
            weights: file.weights,
            min_score: file.min_score,
            tokenizer: Regex::new(r"\p{Han}+|[[\p{L}\p{N}_]--\p{Han}]+")?,
        })
    }

    /// Split text into lower-case word tokens. Han runs become character
    /// unigrams and bigrams, since they carry no word boundaries.
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let mut tokens = Vec::new();

        for run in self.tokenizer.find_iter(&lowered) {
            let run = run.as_str();
            let chars: Vec<char> = run.chars().collect();
            if chars.first().is_some_and(|c| is_han(*c)) {
                tokens.extend(chars.iter().map(char::to_string));
                tokens.extend(chars.windows(2).map(|pair| pair.iter().collect::<String>()));
            } else {
                tokens.push(run.to_string());
            }
        }

        tokens
    }

    /// Predict a category for an app/title pair, or `None` for no opinion.
    #[must_use]
    pub fn predict(&self, app_name: &str, window_title: &str) -> Option<Category> {
        let text = format!("{app_name} | {window_title}");
        let mut scores = self.bias.clone();
        let mut known = 0usize;

        for token in self.tokenize(&text) {
            if let Some(row) = self.weights.get(&token) {
                known += 1;
                for (score, weight) in scores.iter_mut().zip(row) {
                    *score += weight;
                }
            }
        }

        if known == 0 {
            return None;
        }

        let (best, probability) = softmax_argmax(&scores)?;
        if probability < self.min_score {
            log::debug!("Model unsure about {text:?} (p={probability:.2})");
            return None;
        }

        self.labels.get(best).copied().flatten()
    }
}

fn is_han(c: char) -> bool {
    matches!(c, '\u{3400}'..='\u{4dbf}' | '\u{4e00}'..='\u{9fff}' | '\u{f900}'..='\u{faff}')
}

fn softmax_argmax(scores: &[f64]) -> Option<(usize, f64)> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return None;
    }

    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    let (best, top) = exps
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))?;

    let probability = top / total;
    probability.is_finite().then_some((best, probability))
}
