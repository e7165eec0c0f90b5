//! Static catalogue shipped with the binary.
//!
//! Everything here is embedded at compile time from `data/` and parsed once at startup. A
//! malformed file is a build-time authoring mistake, reported as [`NavigatorError::Catalog`]
//! or as the specific invariant it breaks.

use crate::architecture::SystemGraph;
use crate::decision_tree::DecisionTree;
use crate::incident::IncidentDoc;
use crate::wizards::WizardKind;
use crate::{NavigatorError, NavigatorResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const ARCHITECTURE_YAML: &str = include_str!("../data/architecture.yaml");
const DICOM_TREE_YAML: &str = include_str!("../data/trees/dicom.yaml");
const HL7_TREE_YAML: &str = include_str!("../data/trees/hl7.yaml");
const POWERSCRIBE_TREE_YAML: &str = include_str!("../data/trees/powerscribe.yaml");
const INCIDENTS_YAML: &str = include_str!("../data/incidents.yaml");
const ESCALATION_YAML: &str = include_str!("../data/escalation.yaml");
const KNOWLEDGE_BASE_MD: &str = include_str!("../data/knowledge_base.md");

/// One row of the vendor escalation matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EscalationEntry {
    pub component: String,
    pub first_line: String,
    pub engineering: String,
    pub vendor_contact: String,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    graph: SystemGraph,
    dicom: DecisionTree,
    hl7: DecisionTree,
    powerscribe: DecisionTree,
    incidents: Vec<IncidentDoc>,
    escalation: Vec<EscalationEntry>,
    knowledge_base: String,
}

impl Catalog {
    /// Loads the embedded catalogue.
    pub fn builtin() -> NavigatorResult<Self> {
        let incidents: Vec<IncidentDoc> =
            serde_yaml::from_str(INCIDENTS_YAML).map_err(|source| NavigatorError::Catalog {
                name: "incidents",
                source,
            })?;
        let mut seen = HashSet::new();
        if let Some(dup) = incidents.iter().find(|doc| !seen.insert(doc.id.as_str())) {
            return Err(NavigatorError::InvalidInput(format!(
                "duplicate incident id '{}'",
                dup.id
            )));
        }

        let escalation =
            serde_yaml::from_str(ESCALATION_YAML).map_err(|source| NavigatorError::Catalog {
                name: "escalation matrix",
                source,
            })?;

        Ok(Self {
            graph: SystemGraph::from_yaml(ARCHITECTURE_YAML)?,
            dicom: DecisionTree::from_yaml("DICOM", DICOM_TREE_YAML)?,
            hl7: DecisionTree::from_yaml("HL7", HL7_TREE_YAML)?,
            powerscribe: DecisionTree::from_yaml("PowerScribe", POWERSCRIBE_TREE_YAML)?,
            incidents,
            escalation,
            knowledge_base: KNOWLEDGE_BASE_MD.to_owned(),
        })
    }

    pub fn graph(&self) -> &SystemGraph {
        &self.graph
    }

    pub fn tree(&self, kind: WizardKind) -> &DecisionTree {
        match kind {
            WizardKind::Dicom => &self.dicom,
            WizardKind::Hl7 => &self.hl7,
            WizardKind::PowerScribe => &self.powerscribe,
        }
    }

    pub fn incidents(&self) -> &[IncidentDoc] {
        &self.incidents
    }

    pub fn incident(&self, id: &str) -> NavigatorResult<&IncidentDoc> {
        self.incidents
            .iter()
            .find(|doc| doc.id.as_str() == id)
            .ok_or_else(|| NavigatorError::UnknownIncident(id.to_owned()))
    }

    pub fn escalation_matrix(&self) -> &[EscalationEntry] {
        &self.escalation
    }

    /// The knowledge-base document every gateway request is grounded on.
    pub fn knowledge_base(&self) -> &str {
        &self.knowledge_base
    }
}
