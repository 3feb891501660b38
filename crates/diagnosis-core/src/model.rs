use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// Ordered category → number mapping. Iteration follows catalogue order.
pub type CategoryMap = IndexMap<String, f64>;

/// A single diagnostic question from the catalogue.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    /// Question identifier (`No` column) in the text form it is served with
    pub no: String,
    /// Category label (`대분류` column)
    pub category: String,
    /// Point allocation of the category (`배점` column)
    pub allocation: f64,
    /// Level descriptions, one per answer option, in column order
    pub levels: Vec<String>,
    /// The untouched catalogue row, column name → cell
    pub record: serde_json::Map<String, serde_json::Value>,
}

/// One submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Score value of the selected option
    pub value: f64,
    /// Ordinal position of the selected option among the question's levels
    pub level_index: u32,
}

/// Scoring output before a serial id and date are stamped on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Scorecard {
    pub total_score: f64,
    pub category_scores: CategoryMap,
    pub category_levels: CategoryMap,
    pub category_score_allocations: CategoryMap,
}

/// The canonical result payload exchanged with the client.
///
/// Report downloads post this back; only `id` and the three mappings are needed there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    /// Serial id, e.g. "SFactory-0001"
    pub id: String,
    #[serde(default)]
    pub surveyor_name: String,
    /// ISO date, `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    #[serde(default, serialize_with = "serialize_number")]
    pub total_score: f64,
    #[serde(serialize_with = "serialize_category_map")]
    pub category_scores: CategoryMap,
    #[serde(serialize_with = "serialize_category_map")]
    pub category_levels: CategoryMap,
    #[serde(serialize_with = "serialize_category_map")]
    pub category_score_allocations: CategoryMap,
}

impl DiagnosisResult {
    pub fn new(id: String, surveyor_name: String, date: String, scorecard: Scorecard) -> Self {
        Self {
            id,
            surveyor_name,
            date,
            total_score: scorecard.total_score,
            category_scores: scorecard.category_scores,
            category_levels: scorecard.category_levels,
            category_score_allocations: scorecard.category_score_allocations,
        }
    }
}

/// A number as result payloads carry it: integral values without a fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireNumber(pub f64);

impl Serialize for WireNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_number(&self.0, serializer)
    }
}

/// `Some(70)` for `70.0`, `None` for fractional or out-of-range values.
pub(crate) fn as_integer(value: f64) -> Option<i64> {
    (value.fract() == 0.0 && value.abs() < 1e15).then_some(value as i64)
}

/// The category map with every value wrapped for serialization.
pub fn wire_map(map: &CategoryMap) -> IndexMap<&str, WireNumber> {
    map.iter().map(|(k, &v)| (k.as_str(), WireNumber(v))).collect()
}

fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    match as_integer(*value) {
        Some(n) => serializer.serialize_i64(n),
        None => serializer.serialize_f64(*value),
    }
}

fn serialize_category_map<S: Serializer>(map: &CategoryMap, serializer: S) -> Result<S::Ok, S::Error> {
    wire_map(map).serialize(serializer)
}

/// One row of the cumulative roster.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub serial: String,
    pub surveyor_name: String,
    pub date: String,
    pub total_score: f64,
    pub level_name: String,
}
