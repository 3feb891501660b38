use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Number, Value};
use tracing::{error, info};

use crate::error::CoreError;
use crate::model::Question;

pub const NO_COLUMN: &str = "No";
pub const CATEGORY_COLUMN: &str = "대분류";
pub const ALLOCATION_COLUMN: &str = "배점";

const LEVEL_COLUMN_PREFIXES: [&str; 4] = ["Level", "level", "레벨", "수준"];

/// The read-only question table, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    questions: Vec<Question>,
    /// Distinct categories in first-appearance order
    categories: Vec<String>,
    by_no: HashMap<String, usize>,
}

impl Catalogue {
    /// Load the catalogue CSV. A missing file yields an empty catalogue;
    /// any other failure is returned.
    pub fn load_or_empty(path: &Path) -> Result<Self, CoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                error!(path = %path.display(), "question catalogue not found, serving an empty catalogue");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let catalogue = Self::parse(&content)?;
        info!(
            path = %path.display(),
            questions = catalogue.questions.len(),
            categories = catalogue.categories.len(),
            "question catalogue loaded"
        );
        Ok(catalogue)
    }

    pub fn parse(content: &str) -> Result<Self, CoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CoreError::Catalogue(format!("missing column `{name}`")))
        };
        let no_idx = column(NO_COLUMN)?;
        let category_idx = column(CATEGORY_COLUMN)?;
        let allocation_idx = column(ALLOCATION_COLUMN)?;
        let level_idxs: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| LEVEL_COLUMN_PREFIXES.iter().any(|p| h.starts_with(p)))
            .map(|(i, _)| i)
            .collect();

        let mut catalogue = Self::default();
        for row in reader.records() {
            let row = row?;
            let cell = |idx: usize| row.get(idx).unwrap_or("").trim();

            let no = match typed_cell(cell(no_idx)) {
                Value::Null => continue,
                Value::String(text) => text,
                // numeric ids are keyed the way they are served, so "01" answers as "1"
                other => other.to_string(),
            };

            let record: Map<String, Value> = headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), typed_cell(cell(i))))
                .collect();

            let question = Question {
                no: no.clone(),
                category: cell(category_idx).to_string(),
                allocation: cell(allocation_idx).parse().unwrap_or(0.0),
                levels: level_idxs
                    .iter()
                    .map(|&i| cell(i).to_string())
                    .filter(|text| !text.is_empty())
                    .collect(),
                record,
            };

            if !catalogue.categories.contains(&question.category) {
                catalogue.categories.push(question.category.clone());
            }
            catalogue.by_no.entry(no).or_insert(catalogue.questions.len());
            catalogue.questions.push(question);
        }

        Ok(catalogue)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// First question whose identifier matches `no`.
    pub fn question(&self, no: &str) -> Option<&Question> {
        self.by_no.get(no).map(|&i| &self.questions[i])
    }

    /// Allocation of the first catalogue row in `category`.
    pub fn allocation(&self, category: &str) -> Option<f64> {
        self.questions
            .iter()
            .find(|q| q.category == category)
            .map(|q| q.allocation)
    }

    /// Catalogue rows as JSON records, column order preserved.
    pub fn records(&self) -> Vec<Value> {
        self.questions
            .iter()
            .map(|q| Value::Object(q.record.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

fn typed_cell(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Some(n) = text.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(text.to_string())
}
