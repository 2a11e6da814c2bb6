use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::InvalidInput;

/// Digits in a national subscriber number once the trunk zero is dropped.
const NATIONAL_DIGITS: usize = 9;

/// A phone number in canonical `+<country code><national number>` form.
///
/// Customers are identified by phone, so every lookup and insert goes through
/// [`PhoneNumber::parse`]. `0550111222`, `+213 550 111 222` and
/// `00213550111222` all parse to `+213550111222`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str, country_code: &str) -> Result<Self, InvalidInput> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidInput("phone is required".into()));
        }

        let mut international = false;
        let mut digits = String::with_capacity(trimmed.len());
        for (i, ch) in trimmed.chars().enumerate() {
            match ch {
                '0'..='9' => digits.push(ch),
                '+' if i == 0 => international = true,
                ' ' | '-' | '.' | '(' | ')' => {}
                other => {
                    return Err(InvalidInput(format!("phone contains invalid character '{other}'")));
                }
            }
        }

        let national = if international {
            match digits.strip_prefix(country_code) {
                Some(rest) => rest,
                None => return Self::foreign(&digits),
            }
        } else if let Some(rest) = digits.strip_prefix("00") {
            match rest.strip_prefix(country_code) {
                Some(national) => national,
                None => return Self::foreign(rest),
            }
        } else {
            match digits.strip_prefix(country_code) {
                Some(rest) if rest.len() == NATIONAL_DIGITS => rest,
                _ => digits.as_str(),
            }
        };

        let national = national.trim_start_matches('0');
        if national.is_empty() {
            return Err(InvalidInput(format!("phone '{trimmed}' has no subscriber number")));
        }
        Ok(Self(format!("+{country_code}{national}")))
    }

    fn foreign(digits: &str) -> Result<Self, InvalidInput> {
        let digits = digits.trim_start_matches('0');
        if digits.is_empty() {
            return Err(InvalidInput("phone has no subscriber number".into()));
        }
        Ok(Self(format!("+{digits}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Thresholds behind the reliability ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReliabilityPolicy {
    /// Delivered orders needed before a customer counts as reliable.
    pub reliable_after: u32,
    /// Warnings at which a customer is unreliable regardless of deliveries.
    pub warning_limit: u32,
}

impl Default for ReliabilityPolicy {
    fn default() -> Self {
        Self { reliable_after: 3, warning_limit: 3 }
    }
}

/// Trust label shown next to a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    Reliable,
    Warning(u32),
    Unreliable,
}

impl Reliability {
    /// The one place the label is computed. Warnings dominate the flag.
    pub fn derive(warnings: u32, is_reliable: bool, policy: &ReliabilityPolicy) -> Self {
        if warnings >= policy.warning_limit || !is_reliable {
            Reliability::Unreliable
        } else if warnings > 0 {
            Reliability::Warning(warnings)
        } else {
            Reliability::Reliable
        }
    }
}

impl fmt::Display for Reliability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reliability::Reliable => f.write_str("reliable"),
            Reliability::Warning(count) => write!(f, "warning({count})"),
            Reliability::Unreliable => f.write_str("unreliable"),
        }
    }
}

/// Result of a shipped order as reported by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered,
    NotDelivered,
}

/// A storefront customer, keyed by normalized phone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub phone: PhoneNumber,
    pub name: String,
    pub address: String,
    pub total_orders: u32,
    pub delivered_orders: u32,
    pub warnings: u32,
    pub(crate) is_reliable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn is_reliable(&self) -> bool {
        self.is_reliable
    }

    pub fn reliability(&self, policy: &ReliabilityPolicy) -> Reliability {
        Reliability::derive(self.warnings, self.is_reliable, policy)
    }

    pub(crate) fn record_outcome(&mut self, outcome: DeliveryOutcome, policy: &ReliabilityPolicy) {
        match outcome {
            DeliveryOutcome::Delivered => {
                self.delivered_orders += 1;
                self.is_reliable =
                    self.delivered_orders >= policy.reliable_after && self.warnings < policy.warning_limit;
            }
            DeliveryOutcome::NotDelivered => {
                self.warnings += 1;
                if self.warnings >= policy.warning_limit {
                    self.is_reliable = false;
                }
            }
        }
        self.updated_at = Utc::now();
    }
}

/// Payload for registering a customer (or matching an existing one by phone).
#[derive(Debug, Clone)]
pub struct CustomerCreate {
    pub phone: PhoneNumber,
    pub name: String,
    pub address: String,
}

/// Operator edits. Counters and the reliability flag are not patchable.
#[derive(Debug, Clone, Default)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone(raw: &str) -> Result<PhoneNumber, InvalidInput> {
        PhoneNumber::parse(raw, "213")
    }

    fn customer(delivered_orders: u32, warnings: u32, is_reliable: bool) -> Customer {
        Customer {
            id: "customer_1".into(),
            phone: phone("0550111222").unwrap(),
            name: "Amina".into(),
            address: "12 Rue Didouche".into(),
            total_orders: delivered_orders + warnings,
            delivered_orders,
            warnings,
            is_reliable,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_phone_formats_collapse_to_one_identity() {
        let canonical = phone("0550111222").unwrap();
        assert_eq!(canonical.as_str(), "+213550111222");
        for raw in ["+213 550 111 222", "00213550111222", "213550111222", "0550-11-12-22", " (0550) 111.222 "] {
            assert_eq!(phone(raw).unwrap(), canonical, "{raw}");
        }
    }

    #[test]
    fn test_phone_keeps_foreign_numbers() {
        assert_eq!(phone("+33 6 12 34 56 78").unwrap().as_str(), "+33612345678");
        assert_eq!(phone("0033612345678").unwrap().as_str(), "+33612345678");
    }

    #[test]
    fn test_phone_rejects_garbage() {
        assert!(phone("").is_err());
        assert!(phone("   ").is_err());
        assert!(phone("0000").is_err());
        assert!(phone("0550abc").is_err());
        assert!(phone("05+50").is_err());
    }

    #[test]
    fn test_reliability_labels() {
        let policy = ReliabilityPolicy::default();
        assert_eq!(Reliability::derive(0, true, &policy).to_string(), "reliable");
        assert_eq!(Reliability::derive(2, true, &policy).to_string(), "warning(2)");
        assert_eq!(Reliability::derive(0, false, &policy).to_string(), "unreliable");
        assert_eq!(Reliability::derive(4, true, &policy).to_string(), "unreliable");
        assert_eq!(Reliability::derive(3, true, &policy), Reliability::Unreliable);
    }

    #[test]
    fn test_third_delivery_makes_customer_reliable() {
        let policy = ReliabilityPolicy::default();

        let mut second = customer(1, 0, false);
        second.record_outcome(DeliveryOutcome::Delivered, &policy);
        assert_eq!(second.delivered_orders, 2);
        assert!(!second.is_reliable());

        let mut third = customer(2, 0, false);
        third.record_outcome(DeliveryOutcome::Delivered, &policy);
        assert_eq!(third.delivered_orders, 3);
        assert!(third.is_reliable());
        assert_eq!(third.reliability(&policy), Reliability::Reliable);
    }

    #[test]
    fn test_warnings_keep_flag_until_limit() {
        let policy = ReliabilityPolicy::default();
        let mut c = customer(0, 0, true);

        c.record_outcome(DeliveryOutcome::NotDelivered, &policy);
        assert_eq!(c.warnings, 1);
        assert!(c.is_reliable());
        assert_eq!(c.reliability(&policy), Reliability::Warning(1));

        c.record_outcome(DeliveryOutcome::NotDelivered, &policy);
        c.record_outcome(DeliveryOutcome::NotDelivered, &policy);
        assert!(!c.is_reliable());
        assert_eq!(c.reliability(&policy), Reliability::Unreliable);
    }

    #[test]
    fn test_deliveries_do_not_clear_warning_limit() {
        let policy = ReliabilityPolicy::default();
        let mut c = customer(5, 3, false);
        c.record_outcome(DeliveryOutcome::Delivered, &policy);
        assert!(!c.is_reliable());
        assert_eq!(c.reliability(&policy), Reliability::Unreliable);
    }
}
