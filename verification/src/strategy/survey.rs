use shamba_types::{Timestamp, VerificationOutcome};

use super::Evidence;

/// Accepts any uploaded survey report; the surveyor is the trusted party.
#[derive(Clone, Copy, Debug, Default)]
pub struct SurveyStrategy;

impl SurveyStrategy {
    pub fn verify(&self, evidence: &Evidence, now: Timestamp) -> VerificationOutcome {
        match evidence.survey_document.as_deref().map(str::trim) {
            Some(doc) if !doc.is_empty() => VerificationOutcome {
                valid: true,
                survey_date: Some(now),
                ..Default::default()
            },
            _ => VerificationOutcome::failed("No survey report provided"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_report_is_an_error() {
        let out = SurveyStrategy.verify(&Evidence::default(), Timestamp::new(5));
        assert!(out.has_error());
        assert_eq!(out.error.as_deref(), Some("No survey report provided"));

        let blank = SurveyStrategy.verify(&Evidence::with_survey("  "), Timestamp::new(5));
        assert!(blank.has_error());
    }

    #[test]
    fn report_present_is_valid_and_dated() {
        let out = SurveyStrategy.verify(&Evidence::with_survey("surveys/plot-7.pdf"), Timestamp::new(5));
        assert!(out.is_accepted());
        assert_eq!(out.survey_date, Some(Timestamp::new(5)));
    }
}
