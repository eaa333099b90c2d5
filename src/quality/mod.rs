//! Quality-control classification of a predicted value.
//!
//! Each product carries an ordered threshold table (see `ProductProfile`).
//! Rules are evaluated top to bottom and the first match wins; no match means
//! the prediction is within norms.

use crate::domain::{Comparison, ProductKind, QualityStatus, ThresholdRule};

/// Classify a predicted quality value at `elapsed` hours.
pub fn classify(product: ProductKind, predicted: f64, elapsed: f64) -> QualityStatus {
    classify_with(product.profile().thresholds, predicted, elapsed)
}

/// Classify against an explicit rule table.
pub fn classify_with(rules: &[ThresholdRule], predicted: f64, elapsed: f64) -> QualityStatus {
    rules
        .iter()
        .find(|rule| matches_rule(rule, predicted, elapsed))
        .map(|rule| rule.status)
        .unwrap_or(QualityStatus::Normal)
}

fn matches_rule(rule: &ThresholdRule, predicted: f64, elapsed: f64) -> bool {
    let value_hit = match rule.comparison {
        Comparison::Below(bound) => predicted < bound,
        Comparison::Above(bound) => predicted > bound,
    };
    let time_hit = rule.after_hours.is_none_or(|h| elapsed > h);
    value_hit && time_hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Severity;

    #[test]
    fn ayran_thresholds() {
        assert_eq!(classify(ProductKind::Ayran, 3.9, 5.0), QualityStatus::OverAcidified);
        assert_eq!(classify(ProductKind::Ayran, 4.6, 5.0), QualityStatus::Normal);
        assert_eq!(classify(ProductKind::Ayran, 5.2, 7.0), QualityStatus::UnderSet);
        // Under-set only applies after 6 hours.
        assert_eq!(classify(ProductKind::Ayran, 5.2, 6.0), QualityStatus::Normal);
        assert_eq!(classify(ProductKind::Ayran, 5.0, 9.0), QualityStatus::Normal);
    }

    #[test]
    fn irimshik_thresholds() {
        assert_eq!(classify(ProductKind::Irimshik, 14.0, 8.0), QualityStatus::OverDried);
        assert_eq!(classify(ProductKind::Irimshik, 20.0, 8.0), QualityStatus::Normal);
        assert_eq!(classify(ProductKind::Irimshik, 15.0, 8.0), QualityStatus::Normal);
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = [
            ThresholdRule {
                comparison: Comparison::Below(10.0),
                after_hours: None,
                status: QualityStatus::OverDried,
            },
            ThresholdRule {
                comparison: Comparison::Below(20.0),
                after_hours: None,
                status: QualityStatus::UnderSet,
            },
        ];
        assert_eq!(classify_with(&rules, 5.0, 0.0), QualityStatus::OverDried);
        assert_eq!(classify_with(&rules, 15.0, 0.0), QualityStatus::UnderSet);
        assert_eq!(classify_with(&rules, 25.0, 0.0).severity(), Severity::Ok);
    }
}
