//! DICOM tag identifiers
//!
//! [`TagId`] is the stable key of an attribute inside a [`Record`](super::Record).
//! Standard tags have a well-known keyword (see [`keywords`]); private tags live in
//! odd-numbered groups and carry no guaranteed name.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Tag identifier: `(group, element)` pair
///
/// Ordering follows the numeric tag order, which is also the order attributes
/// appear in a DICOM dataset.
///
/// # Examples
///
/// ```
/// use dicom_anonymizer::domain::tags::{keywords, TagId};
/// use std::str::FromStr;
///
/// let tag = TagId::from_str("(0010,0010)").unwrap();
/// assert_eq!(tag, keywords::PATIENT_NAME);
/// assert_eq!(TagId::from_str("PatientName").unwrap(), tag);
/// assert!(!tag.is_private());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId {
    group: u16,
    element: u16,
}

impl TagId {
    /// Creates a tag identifier from its group and element numbers
    pub const fn new(group: u16, element: u16) -> Self {
        Self { group, element }
    }

    /// Group number
    pub const fn group(&self) -> u16 {
        self.group
    }

    /// Element number
    pub const fn element(&self) -> u16 {
        self.element
    }

    /// Vendor-specific tags live in odd-numbered groups
    pub const fn is_private(&self) -> bool {
        self.group % 2 == 1
    }

    /// Standard keyword for this tag, if it is one the anonymizer knows about
    pub fn keyword(&self) -> Option<&'static str> {
        keywords::ALL
            .iter()
            .find(|(_, tag)| tag == self)
            .map(|(name, _)| *name)
    }

    /// Resolves a known keyword (case-sensitive, e.g. `PatientName`)
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        keywords::ALL
            .iter()
            .find(|(name, _)| *name == keyword)
            .map(|(_, tag)| *tag)
    }

    fn parse_hex(s: &str) -> Option<Self> {
        let digits: String = s
            .trim_start_matches('(')
            .trim_end_matches(')')
            .chars()
            .filter(|c| *c != ',')
            .collect();
        if digits.len() != 8 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let group = u16::from_str_radix(&digits[..4], 16).ok()?;
        let element = u16::from_str_radix(&digits[4..], 16).ok()?;
        Some(Self::new(group, element))
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.group, self.element)
    }
}

impl FromStr for TagId {
    type Err = String;

    /// Accepts `(GGGG,EEEE)`, `GGGG,EEEE`, `GGGGEEEE` or a known keyword
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Tag cannot be empty".to_string());
        }
        Self::parse_hex(s)
            .or_else(|| Self::from_keyword(s))
            .ok_or_else(|| format!("Unknown tag '{s}'"))
    }
}

impl Serialize for TagId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TagId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Keyword table for the standard tags the anonymizer references
pub mod keywords {
    use super::TagId;

    pub const SOP_CLASS_UID: TagId = TagId::new(0x0008, 0x0016);
    pub const SOP_INSTANCE_UID: TagId = TagId::new(0x0008, 0x0018);
    pub const STUDY_DATE: TagId = TagId::new(0x0008, 0x0020);
    pub const SERIES_DATE: TagId = TagId::new(0x0008, 0x0021);
    pub const ACQUISITION_DATE: TagId = TagId::new(0x0008, 0x0022);
    pub const CONTENT_DATE: TagId = TagId::new(0x0008, 0x0023);
    pub const ACQUISITION_DATE_TIME: TagId = TagId::new(0x0008, 0x002A);
    pub const STUDY_TIME: TagId = TagId::new(0x0008, 0x0030);
    pub const SERIES_TIME: TagId = TagId::new(0x0008, 0x0031);
    pub const CONTENT_TIME: TagId = TagId::new(0x0008, 0x0033);
    pub const MODALITY: TagId = TagId::new(0x0008, 0x0060);
    pub const MANUFACTURER: TagId = TagId::new(0x0008, 0x0070);
    pub const INSTITUTION_NAME: TagId = TagId::new(0x0008, 0x0080);
    pub const INSTITUTION_ADDRESS: TagId = TagId::new(0x0008, 0x0081);
    pub const REFERRING_PHYSICIAN_NAME: TagId = TagId::new(0x0008, 0x0090);
    pub const STATION_NAME: TagId = TagId::new(0x0008, 0x1010);
    pub const STUDY_DESCRIPTION: TagId = TagId::new(0x0008, 0x1030);
    pub const SERIES_DESCRIPTION: TagId = TagId::new(0x0008, 0x103E);
    pub const PERFORMING_PHYSICIAN_NAME: TagId = TagId::new(0x0008, 0x1050);
    pub const OPERATORS_NAME: TagId = TagId::new(0x0008, 0x1070);
    pub const MANUFACTURER_MODEL_NAME: TagId = TagId::new(0x0008, 0x1090);
    pub const PATIENT_NAME: TagId = TagId::new(0x0010, 0x0010);
    pub const PATIENT_ID: TagId = TagId::new(0x0010, 0x0020);
    pub const PATIENT_BIRTH_DATE: TagId = TagId::new(0x0010, 0x0030);
    pub const PATIENT_SEX: TagId = TagId::new(0x0010, 0x0040);
    pub const PATIENT_AGE: TagId = TagId::new(0x0010, 0x1010);
    pub const PATIENT_ADDRESS: TagId = TagId::new(0x0010, 0x1040);
    pub const PATIENT_TELEPHONE_NUMBERS: TagId = TagId::new(0x0010, 0x2154);
    pub const DEVICE_SERIAL_NUMBER: TagId = TagId::new(0x0018, 0x1000);
    pub const STUDY_INSTANCE_UID: TagId = TagId::new(0x0020, 0x000D);
    pub const SERIES_INSTANCE_UID: TagId = TagId::new(0x0020, 0x000E);
    pub const ROWS: TagId = TagId::new(0x0028, 0x0010);
    pub const COLUMNS: TagId = TagId::new(0x0028, 0x0011);
    pub const PIXEL_DATA: TagId = TagId::new(0x7FE0, 0x0010);

    /// Keyword to tag lookup table
    pub const ALL: &[(&str, TagId)] = &[
        ("SOPClassUID", SOP_CLASS_UID),
        ("SOPInstanceUID", SOP_INSTANCE_UID),
        ("StudyDate", STUDY_DATE),
        ("SeriesDate", SERIES_DATE),
        ("AcquisitionDate", ACQUISITION_DATE),
        ("ContentDate", CONTENT_DATE),
        ("AcquisitionDateTime", ACQUISITION_DATE_TIME),
        ("StudyTime", STUDY_TIME),
        ("SeriesTime", SERIES_TIME),
        ("ContentTime", CONTENT_TIME),
        ("Modality", MODALITY),
        ("Manufacturer", MANUFACTURER),
        ("InstitutionName", INSTITUTION_NAME),
        ("InstitutionAddress", INSTITUTION_ADDRESS),
        ("ReferringPhysicianName", REFERRING_PHYSICIAN_NAME),
        ("StationName", STATION_NAME),
        ("StudyDescription", STUDY_DESCRIPTION),
        ("SeriesDescription", SERIES_DESCRIPTION),
        ("PerformingPhysicianName", PERFORMING_PHYSICIAN_NAME),
        ("OperatorsName", OPERATORS_NAME),
        ("ManufacturerModelName", MANUFACTURER_MODEL_NAME),
        ("PatientName", PATIENT_NAME),
        ("PatientID", PATIENT_ID),
        ("PatientBirthDate", PATIENT_BIRTH_DATE),
        ("PatientSex", PATIENT_SEX),
        ("PatientAge", PATIENT_AGE),
        ("PatientAddress", PATIENT_ADDRESS),
        ("PatientTelephoneNumbers", PATIENT_TELEPHONE_NUMBERS),
        ("DeviceSerialNumber", DEVICE_SERIAL_NUMBER),
        ("StudyInstanceUID", STUDY_INSTANCE_UID),
        ("SeriesInstanceUID", SERIES_INSTANCE_UID),
        ("Rows", ROWS),
        ("Columns", COLUMNS),
        ("PixelData", PIXEL_DATA),
    ];
}
