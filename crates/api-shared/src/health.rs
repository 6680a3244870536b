use crate::dto::{DiseaseStatus, HealthRes};
use screening_core::ArtifactStatus;

/// Health check shared by every API surface.
#[derive(Clone, Debug)]
pub struct HealthService;

impl HealthService {
    /// Reports the service as alive along with per-disease artifact readiness.
    ///
    /// The service stays `ok` while some diseases are degraded, because submissions for them are
    /// still recorded.
    pub fn check_health(statuses: Vec<ArtifactStatus>) -> HealthRes {
        let diseases: Vec<DiseaseStatus> = statuses.into_iter().map(DiseaseStatus::from).collect();
        let degraded = diseases.iter().filter(|d| !d.ready).count();

        let message = if degraded == 0 {
            "Screening service is alive".to_string()
        } else {
            format!(
                "Screening service is alive ({degraded} of {} diseases degraded)",
                diseases.len()
            )
        };

        HealthRes {
            ok: true,
            message,
            diseases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screening_core::DiseaseKey;

    fn status(key: &str, ready: bool) -> ArtifactStatus {
        ArtifactStatus {
            disease: DiseaseKey::new(key).unwrap(),
            ready,
            error: (!ready).then(|| "missing".to_string()),
        }
    }

    #[test]
    fn all_ready_reports_plain_message() {
        let res = HealthService::check_health(vec![status("heart", true)]);
        assert!(res.ok);
        assert_eq!(res.message, "Screening service is alive");
    }

    #[test]
    fn degraded_diseases_are_counted() {
        let res = HealthService::check_health(vec![status("heart", true), status("liver", false)]);
        assert!(res.ok);
        assert!(res.message.contains("1 of 2"));
        assert_eq!(res.diseases[1].error.as_deref(), Some("missing"));
    }
}
