//! Wizard catalogue: the three diagnostic wizards and their scripted sessions.

use crate::decision_tree::{DecisionTree, TreeCursor, TreeNode};
use crate::{NavigatorError, NavigatorResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardKind {
    Dicom,
    Hl7,
    PowerScribe,
}

impl WizardKind {
    pub const ALL: [WizardKind; 3] = [WizardKind::Dicom, WizardKind::Hl7, WizardKind::PowerScribe];

    /// Path segment and CLI name.
    pub fn slug(self) -> &'static str {
        match self {
            WizardKind::Dicom => "dicom",
            WizardKind::Hl7 => "hl7",
            WizardKind::PowerScribe => "powerscribe",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardKind::Dicom => "DICOM Issues Wizard",
            WizardKind::Hl7 => "HL7 Report Failure Wizard",
            WizardKind::PowerScribe => "PowerScribe Failure Wizard",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            WizardKind::Dicom => {
                "Troubleshoot \"Images Not Loading\" and other DICOM-related problems."
            }
            WizardKind::Hl7 => {
                "Diagnose issues with missing reports in EMR/RIS and billing discrepancies."
            }
            WizardKind::PowerScribe => {
                "Diagnose dictation, report status, and workflow interruption issues."
            }
        }
    }

    /// Example first messages offered when a diagnostic chat opens.
    pub fn sample_prompts(self) -> [&'static str; 3] {
        match self {
            WizardKind::Dicom => [
                "Images are loading very slowly.",
                "A specific study won't open.",
                "Is the Unifier for my region online?",
            ],
            WizardKind::Hl7 => [
                "A STAT report is missing from the EMR.",
                "Billing data seems incorrect for recent studies.",
                "Why are reports from yesterday delayed?",
            ],
            WizardKind::PowerScribe => [
                "My dictations aren't triggering a workflow.",
                "A report is stuck in 'pending' status.",
                "Is the PowerScribe API connection healthy?",
            ],
        }
    }

    /// Opening bot message of a diagnostic chat.
    pub fn greeting(self) -> String {
        format!(
            "Starting the {}. I will guide you through diagnosing the issue. Please describe the problem you are encountering.",
            self.title()
        )
    }
}

impl fmt::Display for WizardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for WizardKind {
    type Err = NavigatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WizardKind::ALL
            .into_iter()
            .find(|kind| kind.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| NavigatorError::UnknownWizard(s.to_owned()))
    }
}

/// One open scripted wizard: which tree, and where in it the user is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSession {
    kind: WizardKind,
    cursor: TreeCursor,
}

impl WizardSession {
    pub fn open(kind: WizardKind) -> Self {
        Self {
            kind,
            cursor: TreeCursor::new(),
        }
    }

    pub fn kind(&self) -> WizardKind {
        self.kind
    }

    pub fn cursor(&self) -> &TreeCursor {
        &self.cursor
    }

    pub fn current_node<'t>(&self, tree: &'t DecisionTree) -> NavigatorResult<&'t TreeNode> {
        self.cursor.node(tree)
    }

    pub fn choose<'t>(
        &mut self,
        tree: &'t DecisionTree,
        index: usize,
    ) -> NavigatorResult<&'t TreeNode> {
        self.cursor.choose(tree, index)
    }

    pub fn back<'t>(&mut self, tree: &'t DecisionTree) -> NavigatorResult<&'t TreeNode> {
        self.cursor.back()?;
        self.cursor.node(tree)
    }

    pub fn reset<'t>(&mut self, tree: &'t DecisionTree) -> NavigatorResult<&'t TreeNode> {
        self.cursor.reset();
        self.cursor.node(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_wizard_kind_parses_slugs() {
        assert_eq!("dicom".parse::<WizardKind>().unwrap(), WizardKind::Dicom);
        assert_eq!("HL7".parse::<WizardKind>().unwrap(), WizardKind::Hl7);
        assert_eq!(
            "PowerScribe".parse::<WizardKind>().unwrap(),
            WizardKind::PowerScribe
        );
        assert!(matches!(
            "radiology".parse::<WizardKind>(),
            Err(NavigatorError::UnknownWizard(_))
        ));
    }

    #[test]
    fn test_wizard_kind_serde_matches_slug() {
        for kind in WizardKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.slug()));
        }
    }

    #[test]
    fn test_greeting_names_wizard() {
        assert!(WizardKind::Hl7
            .greeting()
            .starts_with("Starting the HL7 Report Failure Wizard."));
    }

    #[test]
    fn test_wizard_session_lifecycle() {
        let catalog = Catalog::builtin().unwrap();
        let tree = catalog.tree(WizardKind::Hl7);
        let mut session = WizardSession::open(WizardKind::Hl7);
        assert_eq!(session.current_node(tree).unwrap().text, tree.current_node("start").unwrap().text);

        let node = session.choose(tree, 0).unwrap();
        assert_eq!(node.text, "Is the report finalized in PowerScribe?");
        let node = session.choose(tree, 1).unwrap();
        assert!(node.is_terminal());

        let node = session.back(tree).unwrap();
        assert_eq!(node.text, "Is the report finalized in PowerScribe?");

        let node = session.reset(tree).unwrap();
        assert_eq!(node.text, "What is the primary symptom of the HL7 failure?");
        assert!(!session.cursor().can_go_back());
    }

    #[test]
    fn test_sessions_are_independent() {
        let catalog = Catalog::builtin().unwrap();
        let tree = catalog.tree(WizardKind::Dicom);
        let mut first = WizardSession::open(WizardKind::Dicom);
        let second = WizardSession::open(WizardKind::Dicom);
        first.choose(tree, 2).unwrap();
        assert_eq!(first.cursor().current(), "cloud");
        assert_eq!(second.cursor().current(), "start");
    }
}
