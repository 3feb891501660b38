use tracing::info;

use crate::error::CoreError;
use crate::model::{DiagnosisResult, Scorecard};
use crate::serial::SerialAllocator;
use crate::store::ResultStore;

/// Stamps scored submissions with a serial and date and persists them.
///
/// The serial is allocated before anything is written, so a submission that
/// fails to persist still consumes its number.
#[derive(Debug, Clone)]
pub struct Intake {
    serials: SerialAllocator,
    store: ResultStore,
}

impl Intake {
    pub fn new(serials: SerialAllocator, store: ResultStore) -> Self {
        Self { serials, store }
    }

    pub fn record(&self, surveyor_name: String, scorecard: Scorecard) -> Result<DiagnosisResult, CoreError> {
        let serial = self.serials.next_serial()?;
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let result = DiagnosisResult::new(serial, surveyor_name, date, scorecard);

        info!(serial = %result.id, "preparing to save result files");
        self.store.persist(&result)?;
        Ok(result)
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }
}
