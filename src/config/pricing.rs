//! Session fee configuration

use serde::Deserialize;

use crate::domain::foundation::Money;
use crate::domain::payment::PriceSchedule;

use super::error::ValidationError;

/// Session fees as decimal strings, e.g. `COMPANIONX__PRICING__STANDARD=137.50`.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_standard")]
    pub standard: String,

    #[serde(default = "default_reduced")]
    pub reduced: String,
}

impl PricingConfig {
    /// Builds the price schedule used when capturing payments.
    pub fn schedule(&self) -> Result<PriceSchedule, ValidationError> {
        let standard = parse_fee("standard", &self.standard)?;
        let reduced = parse_fee("reduced", &self.reduced)?;
        if reduced > standard {
            return Err(ValidationError::ReducedAboveStandard);
        }
        Ok(PriceSchedule { standard, reduced })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.schedule().map(|_| ())
    }
}

fn parse_fee(tier: &'static str, value: &str) -> Result<Money, ValidationError> {
    match value.parse::<Money>() {
        Ok(fee) if !fee.is_zero() => Ok(fee),
        _ => Err(ValidationError::InvalidPrice {
            tier,
            value: value.to_string(),
        }),
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            standard: default_standard(),
            reduced: default_reduced(),
        }
    }
}

fn default_standard() -> String {
    "137.50".to_string()
}

fn default_reduced() -> String {
    "68.75".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_matches_builtin_fees() {
        let schedule = PricingConfig::default().schedule().unwrap();
        assert_eq!(schedule, PriceSchedule::default());
    }

    #[test]
    fn unparseable_fee_is_rejected() {
        let config = PricingConfig {
            standard: "abc".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidPrice { tier: "standard", .. })
        ));
    }

    #[test]
    fn zero_fee_is_rejected() {
        let config = PricingConfig {
            reduced: "0.00".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn reduced_may_not_exceed_standard() {
        let config = PricingConfig {
            standard: "50.00".to_string(),
            reduced: "68.75".to_string(),
        };
        assert_eq!(config.validate(), Err(ValidationError::ReducedAboveStandard));
    }
}
