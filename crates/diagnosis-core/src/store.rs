use std::io::Write;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};
use tracing::{info, warn};

use crate::error::CoreError;
use crate::model::{wire_map, DiagnosisResult, RosterEntry};
use crate::report::display_number;
use crate::scoring::level_name;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const RECORD_HEADERS: [&str; 7] = [
    "id",
    "surveyorName",
    "date",
    "totalScore",
    "categoryScores",
    "categoryLevels",
    "categoryScoreAllocations",
];

const ROSTER_HEADERS: [&str; 5] = ["일련번호", "설문자 이름", "날짜", "총점", "최종 레벨"];

/// Durable storage for scored submissions: one CSV record per submission plus
/// a cumulative roster spreadsheet.
#[derive(Debug, Clone)]
pub struct ResultStore {
    results_dir: PathBuf,
    roster_path: PathBuf,
}

impl ResultStore {
    pub fn new(results_dir: impl Into<PathBuf>, roster_path: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            roster_path: roster_path.into(),
        }
    }

    /// Write the record file, then append to the roster.
    ///
    /// If the roster update fails the record file is removed again, so a failed
    /// submission leaves neither behind.
    pub fn persist(&self, result: &DiagnosisResult) -> Result<(), CoreError> {
        let record_path = self.write_record(result)?;
        info!(path = %record_path.display(), serial = %result.id, "saved result record");

        if let Err(e) = self.append_roster(result) {
            if let Err(rm) = std::fs::remove_file(&record_path) {
                warn!(error = %rm, path = %record_path.display(), "failed to roll back result record");
            }
            return Err(e);
        }
        info!(path = %self.roster_path.display(), serial = %result.id, "updated surveyor roster");
        Ok(())
    }

    pub fn record_path(&self, result: &DiagnosisResult) -> PathBuf {
        self.results_dir.join(format!(
            "{}_{}.csv",
            result.id,
            sanitize_file_component(&result.surveyor_name)
        ))
    }

    pub fn roster_path(&self) -> &Path {
        &self.roster_path
    }

    /// All roster rows, oldest first. A missing roster reads as empty.
    pub fn roster(&self) -> Result<Vec<RosterEntry>, CoreError> {
        if !self.roster_path.exists() {
            return Ok(Vec::new());
        }
        let mut workbook: Xlsx<_> = calamine::open_workbook(&self.roster_path)?;
        let Some(range) = workbook.worksheet_range_at(0) else {
            return Ok(Vec::new());
        };
        let range = range?;

        Ok(range
            .rows()
            .skip(1)
            .filter(|row| row.first().is_some_and(|c| !cell_text(c).is_empty()))
            .map(|row| {
                let text = |i: usize| row.get(i).map(cell_text).unwrap_or_default();
                RosterEntry {
                    serial: text(0),
                    surveyor_name: text(1),
                    date: text(2),
                    total_score: row.get(3).map(cell_number).unwrap_or(0.0),
                    level_name: text(4),
                }
            })
            .collect())
    }

    fn write_record(&self, result: &DiagnosisResult) -> Result<PathBuf, CoreError> {
        std::fs::create_dir_all(&self.results_dir)?;
        let path = self.record_path(result);

        let mut file = std::fs::File::create(&path)?;
        file.write_all(UTF8_BOM)?;

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(RECORD_HEADERS)?;
        writer.write_record([
            result.id.clone(),
            result.surveyor_name.clone(),
            result.date.clone(),
            display_number(result.total_score),
            serde_json::to_string(&wire_map(&result.category_scores))?,
            serde_json::to_string(&wire_map(&result.category_levels))?,
            serde_json::to_string(&wire_map(&result.category_score_allocations))?,
        ])?;
        writer.flush()?;
        Ok(path)
    }

    fn append_roster(&self, result: &DiagnosisResult) -> Result<(), CoreError> {
        let mut entries = self.roster()?;
        entries.push(RosterEntry {
            serial: result.id.clone(),
            surveyor_name: result.surveyor_name.clone(),
            date: result.date.clone(),
            total_score: result.total_score,
            level_name: level_name(result.total_score).to_string(),
        });

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let bold = Format::new().set_bold();
        for (col, header) in ROSTER_HEADERS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }
        for (i, entry) in entries.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, &entry.serial)?;
            sheet.write_string(row, 1, &entry.surveyor_name)?;
            sheet.write_string(row, 2, &entry.date)?;
            sheet.write_number(row, 3, entry.total_score)?;
            sheet.write_string(row, 4, &entry.level_name)?;
        }

        if let Some(parent) = self.roster_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let staging = self.roster_path.with_extension("xlsx.tmp");
        workbook.save(&staging)?;
        std::fs::rename(&staging, &self.roster_path)?;
        Ok(())
    }
}

fn sanitize_file_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        Data::Float(f) => display_number(*f),
        other => other.to_string(),
    }
}

fn cell_number(cell: &Data) -> f64 {
    match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn result(id: &str, name: &str, total: f64) -> DiagnosisResult {
        let map = |a: f64, b: f64| -> IndexMap<String, f64> {
            [("전략".to_string(), a), ("설비".to_string(), b)].into_iter().collect()
        };
        DiagnosisResult {
            id: id.to_string(),
            surveyor_name: name.to_string(),
            date: "2026-10-19".to_string(),
            total_score: total,
            category_scores: map(total - 40.0, 40.0),
            category_levels: map(2.5, 4.0),
            category_score_allocations: map(100.0, 50.0),
        }
    }

    fn store(dir: &Path) -> ResultStore {
        ResultStore::new(dir.join("results"), dir.join("설문자리스트.xlsx"))
    }

    #[test]
    fn record_file_keeps_korean_text_and_bom() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let result = result("SFactory-0001", "김철수", 70.0);
        store.persist(&result).unwrap();

        let bytes = std::fs::read(store.record_path(&result)).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let mut reader = csv::Reader::from_reader(&bytes[UTF8_BOM.len()..]);
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), RECORD_HEADERS);
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "SFactory-0001");
        assert_eq!(&row[1], "김철수");
        assert_eq!(&row[3], "70");

        assert_eq!(&row[4], r#"{"전략":30,"설비":40}"#);
        let levels: IndexMap<String, f64> = serde_json::from_str(&row[5]).unwrap();
        assert_eq!(levels, result.category_levels);
    }

    #[test]
    fn record_file_name_uses_serial_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let path = store.record_path(&result("SFactory-0003", "a/b", 1.0));
        assert_eq!(path.file_name().unwrap(), "SFactory-0003_a_b.csv");
    }

    #[test]
    fn roster_is_created_then_appended() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        assert!(store.roster().unwrap().is_empty());

        store.persist(&result("SFactory-0001", "김철수", 600.0)).unwrap();
        store.persist(&result("SFactory-0002", "이영희", 960.0)).unwrap();

        let roster = store.roster().unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].serial, "SFactory-0001");
        assert_eq!(roster[0].surveyor_name, "김철수");
        assert_eq!(roster[0].total_score, 600.0);
        assert_eq!(roster[0].level_name, "Level 1");
        assert_eq!(roster[1].serial, "SFactory-0002");
        assert_eq!(roster[1].level_name, "Level 5");
        assert_eq!(roster[1].date, "2026-10-19");
    }

    #[test]
    fn failed_roster_update_rolls_back_record() {
        let dir = tempfile::tempdir().unwrap();
        let roster_path = dir.path().join("설문자리스트.xlsx");
        std::fs::write(&roster_path, b"definitely not a spreadsheet").unwrap();
        let store = ResultStore::new(dir.path().join("results"), &roster_path);

        let result = result("SFactory-0001", "김철수", 70.0);
        assert!(store.persist(&result).is_err());
        assert!(!store.record_path(&result).exists());
    }
}
