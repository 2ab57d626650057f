use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Span reported by the NER service over the exact text it was sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub start_index: usize,
    pub end_index: usize,
}

impl EntitySpan {
    pub fn new(entity_type: impl Into<String>, start_index: usize, end_index: usize) -> Self {
        Self {
            entity_type: entity_type.into(),
            start_index,
            end_index,
        }
    }

    pub fn kind(&self) -> Option<EntityType> {
        EntityType::from_label(&self.entity_type)
    }
}

/// Entity kinds that get redacted. Every other label is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Person,
    OtherPronoun,
    GeoPoliticalLocation,
    OtherLocation,
    Corporation,
    OtherOrganization,
}

impl EntityType {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "PER" => Some(EntityType::Person),
            "PRO_Other" => Some(EntityType::OtherPronoun),
            "LOC_GPE" => Some(EntityType::GeoPoliticalLocation),
            "LOC_Other" => Some(EntityType::OtherLocation),
            "ORG_Corporation" => Some(EntityType::Corporation),
            "ORG_Other" => Some(EntityType::OtherOrganization),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Person => "PER",
            EntityType::OtherPronoun => "PRO_Other",
            EntityType::GeoPoliticalLocation => "LOC_GPE",
            EntityType::OtherLocation => "LOC_Other",
            EntityType::Corporation => "ORG_Corporation",
            EntityType::OtherOrganization => "ORG_Other",
        }
    }
}

/// Unit in which NER span indices count characters.
///
/// The service is consumed by JavaScript clients, so its indices are UTF-16
/// code units by default. `Char` counts Unicode scalar values and `Byte`
/// counts UTF-8 bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetEncoding {
    #[default]
    Utf16,
    Char,
    Byte,
}

impl OffsetEncoding {
    /// Width of `c` in this encoding's units
    pub fn width(&self, c: char) -> usize {
        match self {
            OffsetEncoding::Utf16 => c.len_utf16(),
            OffsetEncoding::Char => 1,
            OffsetEncoding::Byte => c.len_utf8(),
        }
    }
}

impl FromStr for OffsetEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf16" | "utf-16" => Ok(OffsetEncoding::Utf16),
            "char" | "codepoint" => Ok(OffsetEncoding::Char),
            "byte" | "utf8" | "utf-8" => Ok(OffsetEncoding::Byte),
            other => Err(format!("unknown offset encoding: {}", other)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NerRequest<'a> {
    pub sentence: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct NerResponse {
    pub result: Vec<EntitySpan>,
}
