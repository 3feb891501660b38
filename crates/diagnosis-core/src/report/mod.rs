//! Spreadsheet and PDF exports of a diagnosis result.
//!
//! Both outputs share one row model: a row per category, in the iteration order
//! of `categoryLevels`. The table rows and the chart's x-axis categories are
//! always built from the same `ReportRow` list, so their orders agree.

mod chart;
mod pdf;
mod xlsx;

use crate::error::CoreError;
use crate::fonts::FontProfile;
use crate::model::DiagnosisResult;

pub const SHEET_NAME: &str = "진단결과";
pub const DOCUMENT_TITLE: &str = "스마트공장 수준 진단 결과";
pub const CHART_TITLE: &str = "스마트공장 수준 진단결과(5점 척도 기준)";
pub const AREA_LABEL: &str = "영역";
pub const LEVEL_LABEL: &str = "수준";
pub const TABLE_HEADERS: [&str; 4] = [AREA_LABEL, "배점", LEVEL_LABEL, "점수(점)"];

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// One table row / chart bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub category: String,
    pub allocation: f64,
    pub level: f64,
    pub score: f64,
}

/// Renders reports with the font capability chosen at startup.
#[derive(Debug, Clone, Copy)]
pub struct ReportRenderer {
    fonts: FontProfile,
}

impl ReportRenderer {
    pub fn new(fonts: FontProfile) -> Self {
        Self { fonts }
    }

    pub fn spreadsheet(&self, result: &DiagnosisResult) -> Result<Vec<u8>, CoreError> {
        let rows = report_rows(result)?;
        xlsx::render(&rows, &self.fonts)
    }

    pub fn pdf(&self, result: &DiagnosisResult) -> Result<Vec<u8>, CoreError> {
        let rows = report_rows(result)?;
        let chart = chart::render(&rows, &self.fonts)?;
        pdf::render(&rows, &chart, &self.fonts)
    }
}

pub fn spreadsheet_file_name(result: &DiagnosisResult) -> String {
    format!("{}_result.xlsx", result.id)
}

pub fn pdf_file_name(result: &DiagnosisResult) -> String {
    format!("{}_result.pdf", result.id)
}

/// Rows in `categoryLevels` order. Every category there must also have a score
/// and an allocation.
pub fn report_rows(result: &DiagnosisResult) -> Result<Vec<ReportRow>, CoreError> {
    result
        .category_levels
        .iter()
        .map(|(category, &level)| {
            let lookup = |map: &crate::model::CategoryMap, field: &str| {
                map.get(category).copied().ok_or_else(|| {
                    CoreError::InvalidReport(format!("{field} has no entry for category `{category}`"))
                })
            };
            Ok(ReportRow {
                category: category.clone(),
                allocation: lookup(&result.category_score_allocations, "categoryScoreAllocations")?,
                level,
                score: lookup(&result.category_scores, "categoryScores")?,
            })
        })
        .collect()
}

/// `30` for integral values, otherwise the shortest decimal form (`2.25`).
pub fn display_number(value: f64) -> String {
    match crate::model::as_integer(value) {
        Some(n) => n.to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use indexmap::IndexMap;

    pub(crate) fn sample_result() -> DiagnosisResult {
        let map = |values: [f64; 3]| -> IndexMap<String, f64> {
            ["스마트화 전략", "설비 자동화", "데이터 관리"]
                .into_iter()
                .map(String::from)
                .zip(values)
                .collect()
        };
        DiagnosisResult {
            id: "SFactory-0007".to_string(),
            surveyor_name: "김철수".to_string(),
            date: "2026-10-19".to_string(),
            total_score: 170.0,
            category_scores: map([30.0, 40.0, 100.0]),
            category_levels: map([2.0, 4.0, 3.33]),
            category_score_allocations: map([100.0, 50.0, 150.0]),
        }
    }

    #[test]
    fn rows_follow_level_mapping_order() {
        let mut result = sample_result();
        // scores listed in a different order must not change the row order
        result.category_scores.reverse();
        let rows = report_rows(&result).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, ["스마트화 전략", "설비 자동화", "데이터 관리"]);
        assert_eq!(rows[1].allocation, 50.0);
        assert_eq!(rows[1].score, 40.0);
        assert_eq!(rows[2].level, 3.33);
    }

    #[test]
    fn rows_reject_missing_allocation() {
        let mut result = sample_result();
        result.category_score_allocations.shift_remove("설비 자동화");
        let err = report_rows(&result).unwrap_err();
        assert!(matches!(err, CoreError::InvalidReport(_)));
    }

    #[test]
    fn file_names_use_serial() {
        let result = sample_result();
        assert_eq!(spreadsheet_file_name(&result), "SFactory-0007_result.xlsx");
        assert_eq!(pdf_file_name(&result), "SFactory-0007_result.pdf");
    }

    #[test]
    fn numbers_drop_trailing_zero() {
        assert_eq!(display_number(30.0), "30");
        assert_eq!(display_number(2.25), "2.25");
        assert_eq!(display_number(0.0), "0");
        assert_eq!(display_number(-5.0), "-5");
    }
}
