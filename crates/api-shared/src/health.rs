use crate::dto::HealthRes;

/// Health check shared by the REST server and the runner.
#[derive(Clone)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Reports liveness and whether the AI gateway has credentials.
    ///
    /// The server stays up without a gateway key; AI panels then report the failure inline.
    pub fn check_health(gateway_configured: bool) -> HealthRes {
        HealthRes {
            ok: true,
            message: "Knowledge Navigator is alive".into(),
            gateway_configured,
        }
    }
}

impl Default for HealthService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_health_reports_gateway_state() {
        let res = HealthService::check_health(false);
        assert!(res.ok);
        assert!(!res.gateway_configured);
    }
}
