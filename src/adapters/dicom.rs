//! DICOM file codec
//!
//! Reads Part 10 files with `dicom-object` and flattens the top-level dataset into
//! a [`Record`]. The parsed object is kept as the record's source so that saving
//! only has to replay the record's changes (removed elements, rewritten text)
//! onto a copy of it. Pixel data elements are carried over untouched.

use super::codec::{write_atomically, RecordCodec};
use crate::core::verification::checksum::{calculate_checksum_bytes, calculate_checksum_chunks};
use crate::domain::errors::CodecError;
use crate::domain::record::{Attribute, AttributeValue, Record, RecordSource};
use crate::domain::tags::{keywords, TagId};
use dicom_core::dictionary::{DataDictionary, DataDictionaryEntry};
use dicom_core::value::Value;
use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_dictionary_std::StandardDataDictionary;
use dicom_object::{open_file, DefaultDicomObject, InMemDicomObject};
use std::path::Path;

type Element = dicom_object::mem::InMemElement<StandardDataDictionary>;

/// [`RecordCodec`] for DICOM Part 10 files
#[derive(Debug, Clone, Copy, Default)]
pub struct DicomFileCodec;

impl DicomFileCodec {
    pub fn new() -> Self {
        Self
    }
}

impl RecordCodec for DicomFileCodec {
    fn load(&self, path: &Path) -> Result<Record, CodecError> {
        let obj = open_file(path).map_err(|e| CodecError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut record = Record::new();
        for elem in obj.iter() {
            record.insert(to_attribute(elem));
        }

        tracing::trace!(path = %path.display(), attributes = record.len(), "DICOM file loaded");

        Ok(record.with_source(RecordSource::new(obj)))
    }

    fn save(&self, record: &Record, path: &Path) -> Result<(), CodecError> {
        let original = record
            .source()
            .and_then(|source| source.downcast_ref::<DefaultDicomObject>())
            .ok_or(CodecError::MissingSource)?;

        let mut obj = original.clone();
        apply_changes(original, &mut obj, record)?;

        if let Some(uid) = record.text(keywords::SOP_INSTANCE_UID) {
            obj.update_meta(|meta| meta.media_storage_sop_instance_uid = uid.to_string());
        }

        write_atomically(path, |tmp| obj.write_to_file(tmp))
    }
}

/// Replays the record's removals and text rewrites onto `target`
fn apply_changes(
    original: &InMemDicomObject,
    target: &mut InMemDicomObject,
    record: &Record,
) -> Result<(), CodecError> {
    let mut known = 0usize;

    for elem in original.iter() {
        let header = elem.header();
        let tag = TagId::new(header.tag.group(), header.tag.element());

        let Some(attr) = record.get(tag) else {
            target.remove_element(header.tag);
            continue;
        };
        known += 1;

        let current = describe(elem);
        if attr.value == current {
            continue;
        }

        match &attr.value {
            AttributeValue::Text { value } if is_textual_vr(header.vr) => {
                target.put(DataElement::new(
                    header.tag,
                    header.vr,
                    PrimitiveValue::from(value.clone()),
                ));
            }
            other => {
                return Err(CodecError::UnsupportedValue {
                    tag: tag.to_string(),
                    message: format!(
                        "cannot store a {} value in an element of VR {}",
                        other.kind(),
                        header.vr
                    ),
                });
            }
        }
    }

    if known != record.len() {
        let added = record
            .tags()
            .find(|tag| original.element(Tag(tag.group(), tag.element())).is_err())
            .map(|tag| tag.to_string())
            .unwrap_or_default();
        return Err(CodecError::UnsupportedValue {
            tag: added,
            message: "attribute is not present in the source dataset".to_string(),
        });
    }

    Ok(())
}

fn to_attribute(elem: &Element) -> Attribute {
    let header = elem.header();
    let tag = TagId::new(header.tag.group(), header.tag.element());

    let mut attribute = Attribute::new(tag, describe(elem));
    if attribute.name.is_none() && !tag.is_private() {
        if let Some(entry) = StandardDataDictionary.by_tag(header.tag) {
            attribute = attribute.with_name(entry.alias());
        }
    }
    attribute
}

/// Codec-independent view of an element's value
fn describe(elem: &Element) -> AttributeValue {
    match elem.value() {
        Value::Primitive(primitive) if is_binary_vr(elem.header().vr) => {
            let bytes = primitive.to_bytes();
            AttributeValue::Binary {
                len: bytes.len(),
                digest: calculate_checksum_bytes(&bytes),
            }
        }
        Value::Primitive(primitive) => AttributeValue::text(
            primitive
                .to_str()
                .trim_end_matches(|c: char| c == '\0' || c == ' '),
        ),
        Value::Sequence(seq) => AttributeValue::Sequence {
            items: seq.items().len(),
        },
        Value::PixelSequence(seq) => {
            let fragments = seq.fragments();
            AttributeValue::Binary {
                len: fragments.iter().map(Vec::len).sum(),
                digest: calculate_checksum_chunks(fragments.iter().map(Vec::as_slice)),
            }
        }
    }
}

fn is_binary_vr(vr: VR) -> bool {
    matches!(
        vr,
        VR::OB | VR::OW | VR::OF | VR::OD | VR::OL | VR::OV | VR::UN
    )
}

fn is_textual_vr(vr: VR) -> bool {
    matches!(
        vr,
        VR::AE
            | VR::AS
            | VR::CS
            | VR::DA
            | VR::DS
            | VR::DT
            | VR::IS
            | VR::LO
            | VR::LT
            | VR::PN
            | VR::SH
            | VR::ST
            | VR::TM
            | VR::UC
            | VR::UI
            | VR::UR
            | VR::UT
    )
}
