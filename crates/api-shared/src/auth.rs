//! Role-based access for the dashboard tabs.
//!
//! Callers identify their role in the [`ROLE_HEADER`] header. There are no credentials: the
//! role only decides which tabs (and therefore which endpoints) are reachable.

use navigator_core::{Role, Tab};

pub const ROLE_HEADER: &str = "x-navigator-role";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing {ROLE_HEADER} header")]
    MissingRole,
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("role '{role}' cannot access {tab}")]
    Forbidden { role: String, tab: String },
}

/// Resolves the role header value and checks it may open at least one of `tabs`.
///
/// Endpoints shared by several tabs (the wizards, for instance) pass all of them.
pub fn authorize(header: Option<&str>, tabs: &[Tab]) -> Result<Role, AuthError> {
    let value = header
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingRole)?;
    let role: Role = value
        .parse()
        .map_err(|_| AuthError::UnknownRole(value.to_owned()))?;

    if tabs.iter().any(|tab| role.can_access(*tab)) {
        return Ok(role);
    }

    Err(AuthError::Forbidden {
        role: role.label().to_owned(),
        tab: tabs.first().map(|t| t.label()).unwrap_or_default().to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_missing_header() {
        assert!(matches!(
            authorize(None, &[Tab::Architecture]),
            Err(AuthError::MissingRole)
        ));
        assert!(matches!(
            authorize(Some("  "), &[Tab::Architecture]),
            Err(AuthError::MissingRole)
        ));
    }

    #[test]
    fn test_authorize_unknown_role() {
        assert!(matches!(
            authorize(Some("janitor"), &[Tab::Architecture]),
            Err(AuthError::UnknownRole(r)) if r == "janitor"
        ));
    }

    #[test]
    fn test_authorize_checks_tab() {
        assert_eq!(
            authorize(Some("support-engineer"), &[Tab::SupportHub]).unwrap(),
            Role::SupportEngineer
        );
        assert!(matches!(
            authorize(Some("system-architect"), &[Tab::SupportHub]),
            Err(AuthError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_authorize_any_of_several_tabs() {
        let tabs = [Tab::SupportCenter, Tab::SupportHub];
        assert!(authorize(Some("support-engineer"), &tabs).is_ok());
        assert!(authorize(Some("clinical-staff"), &tabs).is_ok());
        assert!(matches!(
            authorize(Some("lm-trainer"), &[Tab::SupportHub]),
            Err(AuthError::Forbidden { tab, .. }) if tab == "Integrated Support Hub"
        ));
    }
}
