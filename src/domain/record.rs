//! In-memory record model
//!
//! A [`Record`] is the codec-independent view of one imaging file: an ordered
//! mapping from [`TagId`] to [`Attribute`]. Pixel payload and any other binary
//! content are represented only by their length and digest; the bytes themselves
//! stay inside the codec's opaque source handle and are never touched by the
//! anonymization engine.

use super::tags::{keywords, TagId};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Value held by an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeValue {
    /// Textual (stringifiable) value; multi-valued elements are joined with `\`
    Text { value: String },

    /// Nested sequence; only the item count is exposed
    Sequence { items: usize },

    /// Opaque binary content (pixel data, OB/OW blobs)
    Binary { len: usize, digest: String },
}

impl AttributeValue {
    /// Shorthand for a textual value
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Textual content, if this value can be stringified
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { value } => Some(value),
            _ => None,
        }
    }

    /// Short name of the value kind, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Sequence { .. } => "sequence",
            Self::Binary { .. } => "binary",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { value } => write!(f, "{value}"),
            Self::Sequence { items } => write!(f, "<sequence: {items} item(s)>"),
            Self::Binary { len, .. } => write!(f, "<binary: {len} bytes>"),
        }
    }
}

/// One attribute of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Tag identifier (also the attribute's key in the record)
    pub tag: TagId,

    /// Display name from the tag dictionary, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Attribute value
    pub value: AttributeValue,

    /// Vendor/private classification as reported by the codec
    #[serde(default)]
    pub private: bool,
}

impl Attribute {
    /// Creates an attribute, classifying it as private by its group number
    pub fn new(tag: TagId, value: AttributeValue) -> Self {
        Self {
            tag,
            name: tag.keyword().map(str::to_string),
            value,
            private: tag.is_private(),
        }
    }

    /// Creates a textual attribute
    pub fn text(tag: TagId, value: impl Into<String>) -> Self {
        Self::new(tag, AttributeValue::text(value))
    }

    /// Overrides the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Overrides the private classification
    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Display name, falling back to the tag literal
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.tag.to_string())
    }
}

/// Opaque handle to the codec's original dataset
///
/// Codecs stash whatever they need to write the record back (including the
/// untouched pixel payload) and downcast it again on save.
#[derive(Clone)]
pub struct RecordSource(Arc<dyn Any + Send + Sync>);

impl RecordSource {
    /// Wraps a codec-specific dataset
    pub fn new<T: Any + Send + Sync>(source: T) -> Self {
        Self(Arc::new(source))
    }

    /// Borrows the dataset as the codec's concrete type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecordSource(..)")
    }
}

/// One imaging file's metadata
///
/// At most one attribute per tag. Attributes are kept in tag order.
///
/// # Examples
///
/// ```
/// use dicom_anonymizer::domain::{Attribute, Record};
/// use dicom_anonymizer::domain::tags::keywords;
///
/// let mut record = Record::new();
/// record.insert(Attribute::text(keywords::PATIENT_NAME, "Doe^Jane"));
/// assert!(record.contains(keywords::PATIENT_NAME));
/// assert_eq!(record.len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    #[serde(with = "attribute_list")]
    attributes: BTreeMap<TagId, Attribute>,

    #[serde(skip)]
    source: Option<RecordSource>,
}

impl Record {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from attributes; later duplicates replace earlier ones
    pub fn from_attributes(attributes: impl IntoIterator<Item = Attribute>) -> Self {
        let mut record = Self::new();
        for attribute in attributes {
            record.insert(attribute);
        }
        record
    }

    /// Attaches the codec's source dataset
    pub fn with_source(mut self, source: RecordSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Codec source dataset, if the record was loaded by a codec
    pub fn source(&self) -> Option<&RecordSource> {
        self.source.as_ref()
    }

    /// Inserts or replaces the attribute stored under its tag
    pub fn insert(&mut self, attribute: Attribute) -> Option<Attribute> {
        self.attributes.insert(attribute.tag, attribute)
    }

    /// Removes an attribute
    pub fn remove(&mut self, tag: TagId) -> Option<Attribute> {
        self.attributes.remove(&tag)
    }

    pub fn get(&self, tag: TagId) -> Option<&Attribute> {
        self.attributes.get(&tag)
    }

    pub fn get_mut(&mut self, tag: TagId) -> Option<&mut Attribute> {
        self.attributes.get_mut(&tag)
    }

    pub fn contains(&self, tag: TagId) -> bool {
        self.attributes.contains_key(&tag)
    }

    /// Textual value of an attribute, if present and textual
    pub fn text(&self, tag: TagId) -> Option<&str> {
        self.get(tag).and_then(|attr| attr.value.as_text())
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attributes in tag order
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    /// Tags in tag order
    pub fn tags(&self) -> impl Iterator<Item = TagId> + '_ {
        self.attributes.keys().copied()
    }

    /// Whether the record carries a pixel payload
    pub fn has_pixel_data(&self) -> bool {
        self.contains(keywords::PIXEL_DATA)
    }

    /// Digest of the pixel payload, if present and binary
    pub fn pixel_digest(&self) -> Option<&str> {
        match self.get(keywords::PIXEL_DATA).map(|attr| &attr.value) {
            Some(AttributeValue::Binary { digest, .. }) => Some(digest),
            _ => None,
        }
    }
}

impl PartialEq for Record {
    /// Records compare by attributes only; the source handle is opaque
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
    }
}

/// Serializes the attribute map as a plain list in tag order
mod attribute_list {
    use super::{Attribute, TagId};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub(super) fn serialize<S: Serializer>(
        attributes: &BTreeMap<TagId, Attribute>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(attributes.values())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<TagId, Attribute>, D::Error> {
        let list = Vec::<Attribute>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|attr| (attr.tag, attr)).collect())
    }
}
