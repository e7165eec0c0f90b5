//! Dataset generator inputs and the JSON export artifact.

use crate::constants::{DEFAULT_DATASET_COUNT, MAX_DATASET_COUNT, MIN_DATASET_COUNT};
use crate::{NavigatorError, NavigatorResult};
use chrono::{DateTime, SecondsFormat, Utc};
use navigator_types::NonEmptyText;
use serde::{Deserialize, Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

/// Topics offered by the dataset generator.
pub const TOPICS: [&str; 5] = [
    "HL7 Message Flow Failures",
    "DICOM Image Delivery Problems",
    "PowerScribe Integration Failures",
    "Performance Monitoring & Alerting",
    "Vendor Escalation Matrix",
];

/// Personas whose voice the generated questions take.
pub const PERSONAS: [&str; 3] = ["Support Engineer", "System Architect", "Clinical Staff"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRequest {
    pub topic: NonEmptyText,
    pub persona: NonEmptyText,
    pub count: u32,
}

impl DatasetRequest {
    /// Validates topic and persona and clamps `count` into the accepted range.
    pub fn new(topic: &str, persona: &str, count: Option<u32>) -> NavigatorResult<Self> {
        Ok(Self {
            topic: NonEmptyText::new(topic)?,
            persona: NonEmptyText::new(persona)?,
            count: clamp_count(count),
        })
    }
}

pub fn clamp_count(count: Option<u32>) -> u32 {
    count
        .unwrap_or(DEFAULT_DATASET_COUNT)
        .clamp(MIN_DATASET_COUNT, MAX_DATASET_COUNT)
}

fn serialize_iso_millis<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFrom {
    pub topic: String,
    pub persona: String,
    pub count: u32,
    #[serde(serialize_with = "serialize_iso_millis")]
    pub timestamp: DateTime<Utc>,
}

/// Downloadable dataset: the request that produced it plus the pairs the gateway returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetExport {
    pub generated_from: GeneratedFrom,
    pub dataset: Vec<QaPair>,
}

impl DatasetExport {
    pub fn new(request: &DatasetRequest, dataset: Vec<QaPair>, timestamp: DateTime<Utc>) -> Self {
        Self {
            generated_from: GeneratedFrom {
                topic: request.topic.to_string(),
                persona: request.persona.to_string(),
                count: request.count,
                timestamp,
            },
            dataset,
        }
    }

    pub fn filename(&self) -> String {
        export_filename(&self.generated_from.topic, self.generated_from.timestamp)
    }

    pub fn to_json_pretty(&self) -> NavigatorResult<String> {
        serde_json::to_string_pretty(self).map_err(NavigatorError::Serialization)
    }

    /// Writes the export into `dir` under [`DatasetExport::filename`] and returns the path.
    pub fn write_to(&self, dir: &Path) -> NavigatorResult<PathBuf> {
        let path = dir.join(self.filename());
        fs::write(&path, self.to_json_pretty()?).map_err(NavigatorError::FileWrite)?;
        Ok(path)
    }
}

/// `dataset_<topic>_<epoch ms>.json`, with whitespace (and path separators) in the topic
/// replaced by underscores.
pub fn export_filename(topic: &str, at: DateTime<Utc>) -> String {
    let topic: String = topic
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("dataset_{}_{}.json", topic, at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap()
    }

    #[test]
    fn test_export_filename_replaces_spaces() {
        let name = export_filename("HL7 Message Flow Failures", at());
        assert!(name.contains("HL7_Message_Flow_Failures"));
        assert!(name.ends_with(".json"));
        assert_eq!(
            name,
            format!("dataset_HL7_Message_Flow_Failures_{}.json", at().timestamp_millis())
        );
    }

    #[test]
    fn test_export_filename_keeps_file_in_directory() {
        let name = export_filename("a/b\\c", at());
        assert!(!name.contains('/') && !name.contains('\\'));
    }

    #[test]
    fn test_count_is_clamped() {
        assert_eq!(clamp_count(None), DEFAULT_DATASET_COUNT);
        assert_eq!(clamp_count(Some(0)), 1);
        assert_eq!(clamp_count(Some(7)), 7);
        assert_eq!(clamp_count(Some(500)), 20);
    }

    #[test]
    fn test_request_rejects_blank_topic() {
        assert!(matches!(
            DatasetRequest::new("  ", "Support Engineer", None),
            Err(NavigatorError::EmptyInput)
        ));
    }

    #[test]
    fn test_export_json_shape() {
        let request = DatasetRequest::new(TOPICS[0], PERSONAS[1], Some(1)).unwrap();
        let export = DatasetExport::new(
            &request,
            vec![QaPair {
                question: "Where are ORU messages routed?".into(),
                answer: "Through the IRIS engine.".into(),
            }],
            at(),
        );
        let value: serde_json::Value =
            serde_json::from_str(&export.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["generated_from"]["topic"], TOPICS[0]);
        assert_eq!(value["generated_from"]["persona"], "System Architect");
        assert_eq!(value["generated_from"]["count"], 1);
        assert_eq!(value["generated_from"]["timestamp"], "2026-03-04T05:06:07.000Z");
        assert_eq!(value["dataset"][0]["answer"], "Through the IRIS engine.");
    }

    #[test]
    fn test_write_to_directory() {
        let dir = TempDir::new().unwrap();
        let request = DatasetRequest::new("Vendor Escalation Matrix", "Clinical Staff", None).unwrap();
        let export = DatasetExport::new(&request, vec![], at());
        let path = export.write_to(dir.path()).unwrap();
        assert_eq!(path.parent().unwrap(), dir.path());
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"dataset\": []"));
    }
}
