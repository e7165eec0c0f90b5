//! Roles and the dashboard tabs each role may open.

use crate::{NavigatorError, NavigatorResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    SupportEngineer,
    SystemArchitect,
    ClinicalStaff,
    LmTrainer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    Architecture,
    SupportCenter,
    KnowledgeEngine,
    DatasetGenerator,
    SupportHub,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::SupportEngineer,
        Role::SystemArchitect,
        Role::ClinicalStaff,
        Role::LmTrainer,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Role::SupportEngineer => "support-engineer",
            Role::SystemArchitect => "system-architect",
            Role::ClinicalStaff => "clinical-staff",
            Role::LmTrainer => "lm-trainer",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::SupportEngineer => "Support Engineer",
            Role::SystemArchitect => "System Architect",
            Role::ClinicalStaff => "Clinical Staff",
            Role::LmTrainer => "LM Trainer",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Role::SupportEngineer => {
                "Access troubleshooting guides, escalation matrix, and performance dashboards."
            }
            Role::SystemArchitect => {
                "Explore system diagrams, data flows, and integration point details."
            }
            Role::ClinicalStaff => {
                "View system status, communication templates, and common issue workarounds."
            }
            Role::LmTrainer => {
                "Use the knowledge engine and generate structured datasets for model training."
            }
        }
    }

    /// Tabs shown to this role, in navigation order.
    pub fn visible_tabs(self) -> Vec<Tab> {
        match self {
            Role::SupportEngineer => vec![Tab::SupportHub, Tab::Architecture],
            Role::LmTrainer => vec![
                Tab::Architecture,
                Tab::SupportCenter,
                Tab::KnowledgeEngine,
                Tab::DatasetGenerator,
            ],
            Role::SystemArchitect | Role::ClinicalStaff => {
                vec![Tab::Architecture, Tab::SupportCenter, Tab::KnowledgeEngine]
            }
        }
    }

    pub fn default_tab(self) -> Tab {
        match self {
            Role::SupportEngineer => Tab::SupportHub,
            _ => Tab::Architecture,
        }
    }

    pub fn can_access(self, tab: Tab) -> bool {
        self.visible_tabs().contains(&tab)
    }

    pub fn authorize(self, tab: Tab) -> NavigatorResult<()> {
        if self.can_access(tab) {
            Ok(())
        } else {
            Err(NavigatorError::Forbidden {
                role: self.label().to_owned(),
                tab: tab.label().to_owned(),
            })
        }
    }
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Architecture,
        Tab::SupportCenter,
        Tab::KnowledgeEngine,
        Tab::DatasetGenerator,
        Tab::SupportHub,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Tab::Architecture => "architecture",
            Tab::SupportCenter => "support-center",
            Tab::KnowledgeEngine => "knowledge-engine",
            Tab::DatasetGenerator => "dataset-generator",
            Tab::SupportHub => "support-hub",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Architecture => "System Architecture Explorer",
            Tab::SupportCenter => "Support Operations Center",
            Tab::KnowledgeEngine => "Knowledge Extraction Engine",
            Tab::DatasetGenerator => "Dataset Generator",
            Tab::SupportHub => "Integrated Support Hub",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tab::Architecture => {
                "Visually explore system components, data flows, and integration points."
            }
            Tab::SupportCenter => {
                "Use interactive tools to diagnose issues and find escalation procedures."
            }
            Tab::KnowledgeEngine => {
                "Ask questions and get answers from the support documentation using AI."
            }
            Tab::DatasetGenerator => {
                "Generate structured Q&A datasets for model training and validation."
            }
            Tab::SupportHub => {
                "A unified view for diagnostics, AI chat, and documentation generation."
            }
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = NavigatorError;

    /// Accepts the slug (`lm-trainer`) or the label (`LM Trainer`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| {
                role.slug().eq_ignore_ascii_case(wanted) || role.label().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| NavigatorError::UnknownRole(s.to_owned()))
    }
}
