//! Shared fixtures for integration tests
//!
//! Records are stored as JSON so tests can build input trees without a DICOM
//! encoder; anything that does not parse as a record is a corrupt file.

#![allow(dead_code)]

use dicom_anonymizer::adapters::codec::write_atomically;
use dicom_anonymizer::adapters::RecordCodec;
use dicom_anonymizer::core::batch::{BatchObserver, BatchStatistics};
use dicom_anonymizer::domain::{
    keywords, Attribute, AttributeValue, BatchError, CodecError, Record, TagId,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Record codec backed by JSON files
#[derive(Debug, Default)]
pub struct JsonCodec;

impl RecordCodec for JsonCodec {
    fn load(&self, path: &Path) -> Result<Record, CodecError> {
        let read_error = |message: String| CodecError::Read {
            path: path.to_path_buf(),
            message,
        };
        let contents = fs::read_to_string(path).map_err(|e| read_error(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| read_error(e.to_string()))
    }

    fn save(&self, record: &Record, path: &Path) -> Result<(), CodecError> {
        let json = serde_json::to_string_pretty(record).map_err(|e| CodecError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        write_atomically(path, |tmp| fs::write(tmp, &json))
    }
}

/// A fully identified CT record with one private tag and pixel data
pub fn sample_record(patient: &str) -> Record {
    Record::from_attributes([
        Attribute::text(keywords::SOP_CLASS_UID, "1.2.840.10008.5.1.4.1.1.2"),
        Attribute::text(keywords::SOP_INSTANCE_UID, "1.2.826.0.1.3680043.2.1125.1"),
        Attribute::text(keywords::STUDY_DATE, "20210615"),
        Attribute::text(keywords::SERIES_DATE, "20210615"),
        Attribute::text(keywords::ACQUISITION_DATE, "20210615"),
        Attribute::text(keywords::STUDY_TIME, "101500"),
        Attribute::text(keywords::MODALITY, "CT"),
        Attribute::text(keywords::MANUFACTURER, "ACME Imaging"),
        Attribute::text(keywords::INSTITUTION_NAME, "General Hospital"),
        Attribute::text(keywords::REFERRING_PHYSICIAN_NAME, "House^Gregory"),
        Attribute::text(keywords::OPERATORS_NAME, "Tech^Terry"),
        Attribute::text(keywords::PATIENT_NAME, patient),
        Attribute::text(keywords::PATIENT_ID, "P-0001"),
        Attribute::text(keywords::PATIENT_BIRTH_DATE, "19800214"),
        Attribute::text(keywords::PATIENT_SEX, "F"),
        Attribute::text(keywords::STUDY_INSTANCE_UID, "1.2.826.0.1.3680043.2.1125.2"),
        Attribute::text(keywords::SERIES_INSTANCE_UID, "1.2.826.0.1.3680043.2.1125.3"),
        Attribute::text(TagId::new(0x0009, 0x1001), "vendor secret"),
        Attribute::text(keywords::ROWS, "512"),
        Attribute::text(keywords::COLUMNS, "512"),
        Attribute::new(
            keywords::PIXEL_DATA,
            AttributeValue::Binary {
                len: 524_288,
                digest: "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
                    .to_string(),
            },
        ),
    ])
}

/// Write `record` as JSON under `root/relative`
pub fn write_record(root: &Path, relative: &str, record: &Record) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, serde_json::to_string(record).unwrap()).unwrap();
    path
}

/// Write bytes that no codec can parse
pub fn write_corrupt(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, b"\x00\x01 definitely not a record").unwrap();
    path
}

/// Observer that keeps every notification for later assertions
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub progress: Mutex<Vec<u8>>,
    pub statuses: Mutex<Vec<String>>,
    pub finished: Mutex<Vec<Result<BatchStatistics, BatchError>>>,
}

impl RecordingObserver {
    pub fn progress(&self) -> Vec<u8> {
        self.progress.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn finished(&self) -> Vec<Result<BatchStatistics, BatchError>> {
        self.finished.lock().unwrap().clone()
    }
}

impl BatchObserver for RecordingObserver {
    fn on_progress(&self, percent: u8) {
        self.progress.lock().unwrap().push(percent);
    }

    fn on_status(&self, status: &str) {
        self.statuses.lock().unwrap().push(status.to_string());
    }

    fn on_finished(&self, result: &Result<BatchStatistics, BatchError>) {
        self.finished.lock().unwrap().push(result.clone());
    }
}
