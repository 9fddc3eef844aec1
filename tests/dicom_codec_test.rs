//! End-to-end tests with real DICOM files
//!
//! Files are built with `dicom-object`, run through the batch pipeline with the
//! DICOM codec, and read back to check both the dataset and the file meta.

use dicom_anonymizer::adapters::{DicomFileCodec, RecordCodec};
use dicom_anonymizer::anonymization::config::DEFAULT_PLACEHOLDER;
use dicom_anonymizer::anonymization::{AnonymizationConfig, AnonymizationEngine, RuleSet};
use dicom_anonymizer::cli::commands::verify::VerifyArgs;
use dicom_anonymizer::config::BatchConfig;
use dicom_anonymizer::core::batch::{BatchJob, BatchPipeline, NoopObserver};
use dicom_anonymizer::core::verification::Verifier;
use dicom_anonymizer::domain::{keywords, TagId};
use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_object::{open_file, FileMetaTableBuilder, InMemDicomObject};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const SOP_INSTANCE_UID: &str = "1.2.826.0.1.3680043.2.1125.7";

fn write_ct(path: &Path, patient: &str) {
    let obj = InMemDicomObject::from_element_iter([
        DataElement::new(
            tags::SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(uids::CT_IMAGE_STORAGE),
        ),
        DataElement::new(
            tags::SOP_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(SOP_INSTANCE_UID),
        ),
        DataElement::new(tags::STUDY_DATE, VR::DA, PrimitiveValue::from("20210615")),
        DataElement::new(
            tags::ACQUISITION_DATE,
            VR::DA,
            PrimitiveValue::from("20210615"),
        ),
        DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from("CT")),
        DataElement::new(
            tags::INSTITUTION_NAME,
            VR::LO,
            PrimitiveValue::from("General Hospital"),
        ),
        DataElement::new(
            tags::REFERRING_PHYSICIAN_NAME,
            VR::PN,
            PrimitiveValue::from("House^Gregory"),
        ),
        DataElement::new(tags::PATIENT_NAME, VR::PN, PrimitiveValue::from(patient)),
        DataElement::new(tags::PATIENT_ID, VR::LO, PrimitiveValue::from("P-0001")),
        DataElement::new(
            tags::STUDY_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from("1.2.826.0.1.3680043.2.1125.8"),
        ),
        DataElement::new(Tag(0x0009, 0x0010), VR::LO, PrimitiveValue::from("ACME")),
        DataElement::new(Tag(0x0009, 0x1001), VR::LO, PrimitiveValue::from("secret")),
        DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(2_u16)),
        DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(2_u16)),
        DataElement::new(
            tags::PIXEL_DATA,
            VR::OW,
            PrimitiveValue::from(vec![9_u8, 8, 7, 6, 5, 4, 3, 2]),
        ),
    ]);

    let file = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
                .media_storage_sop_instance_uid(SOP_INSTANCE_UID),
        )
        .unwrap();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    file.write_to_file(path).unwrap();
}

fn pipeline() -> BatchPipeline {
    BatchPipeline::new(
        Arc::new(DicomFileCodec::new()),
        AnonymizationEngine::new(),
        Arc::new(RuleSet::from_config(&AnonymizationConfig::default()).unwrap()),
        BatchConfig::default(),
    )
}

#[test]
fn test_batch_anonymizes_dicom_tree() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_ct(&input.path().join("patient1/ct1.dcm"), "Doe^Jane");
    write_ct(&input.path().join("patient2/ct2.dcm"), "Roe^Richard");
    std::fs::write(input.path().join("patient2/broken.dcm"), b"DICM?").unwrap();

    let stats = pipeline()
        .run(&BatchJob::new(input.path(), output.path()), &NoopObserver)
        .unwrap();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.successful, 2);
    assert_eq!(stats.failed, 1);
    assert!(stats.errors[0].file.ends_with("broken.dcm"));

    let codec = DicomFileCodec::new();
    let original = codec.load(&input.path().join("patient1/ct1.dcm")).unwrap();
    let anonymized = codec.load(&output.path().join("patient1/ct1.dcm")).unwrap();

    assert!(!anonymized.contains(keywords::PATIENT_NAME));
    assert!(!anonymized.contains(keywords::PATIENT_ID));
    assert!(!anonymized.contains(keywords::STUDY_DATE));
    assert!(!anonymized.contains(keywords::STUDY_INSTANCE_UID));
    assert!(!anonymized.contains(TagId::new(0x0009, 0x0010)));
    assert!(!anonymized.contains(TagId::new(0x0009, 0x1001)));
    assert_eq!(anonymized.text(keywords::ACQUISITION_DATE), Some("20210101"));
    assert_eq!(anonymized.text(keywords::INSTITUTION_NAME), Some("ANONYMIZED"));
    assert_eq!(
        anonymized.text(keywords::REFERRING_PHYSICIAN_NAME),
        Some("ANONYMIZED")
    );
    assert_eq!(anonymized.text(keywords::MODALITY), Some("CT"));
    assert_eq!(anonymized.text(keywords::ROWS), Some("2"));

    let new_uid = anonymized.text(keywords::SOP_INSTANCE_UID).unwrap();
    assert_ne!(new_uid, SOP_INSTANCE_UID);
    assert!(new_uid.starts_with("2.25."));

    let file = open_file(output.path().join("patient1/ct1.dcm")).unwrap();
    assert_eq!(
        file.meta()
            .media_storage_sop_instance_uid
            .trim_end_matches('\0'),
        new_uid
    );

    let report = Verifier::new().verify(&original, &anonymized);
    assert_eq!(report.pixel_data_unchanged, Some(true));
    assert_eq!(report.tags_removed, 6);
    let replaced: Vec<&str> = report.replaced.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(replaced, vec!["ReferringPhysicianName", "InstitutionName"]);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_verify_command_accepts_default_output() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_ct(&input.path().join("ct.dcm"), "Doe^Jane");

    pipeline()
        .run(&BatchJob::new(input.path(), output.path()), &NoopObserver)
        .unwrap();

    let anonymized = VerifyArgs {
        original: input.path().join("ct.dcm"),
        anonymized: output.path().join("ct.dcm"),
        json: false,
    };
    assert_eq!(anonymized.execute(DEFAULT_PLACEHOLDER).await.unwrap(), 0);

    // Comparing the original with itself finds every sensitive value
    let untouched = VerifyArgs {
        original: input.path().join("ct.dcm"),
        anonymized: input.path().join("ct.dcm"),
        json: true,
    };
    assert_eq!(untouched.execute(DEFAULT_PLACEHOLDER).await.unwrap(), 1);
}

#[test]
fn test_reanonymizing_output_changes_only_uids() {
    let input = TempDir::new().unwrap();
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write_ct(&input.path().join("ct.dcm"), "Doe^Jane");

    pipeline()
        .run(&BatchJob::new(input.path(), first.path()), &NoopObserver)
        .unwrap();
    let stats = pipeline()
        .run(&BatchJob::new(first.path(), second.path()), &NoopObserver)
        .unwrap();

    assert_eq!(stats.successful, 1);
    assert_eq!(stats.tags_removed_total, 0);
    assert_eq!(stats.mutations_total, 0);

    let codec = DicomFileCodec::new();
    let once = codec.load(&first.path().join("ct.dcm")).unwrap();
    let twice = codec.load(&second.path().join("ct.dcm")).unwrap();
    assert_eq!(once.len(), twice.len());
    assert_ne!(
        once.text(keywords::SOP_INSTANCE_UID),
        twice.text(keywords::SOP_INSTANCE_UID)
    );
}
