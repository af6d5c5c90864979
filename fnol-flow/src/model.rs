use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Postal address. Empty strings mean "not provided" and are omitted from
/// the generated report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub address_one: String,
    pub address_two: String,
    pub city: String,
    pub state: String,
    pub country: String,
    /// Free-form country name when `country` is set to "Other".
    pub custom_country: String,
    pub postal_code: String,
}

/// A person record shared by the reporter, insured contact, witnesses and
/// claimants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Party {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(flatten)]
    pub address: Address,
}

/// The person filing the notice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Reporter {
    pub relation_to_insured: String,
    #[serde(flatten)]
    pub party: Party,
}

/// Insured policy details. When `contact_same_as_reporter` is set the
/// `contact` fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub policy_number: String,
    pub contact_same_as_reporter: bool,
    #[serde(flatten)]
    pub contact: Party,
}

/// Police/fire/other authority report attached to the loss.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityReport {
    pub kind: String,
    pub report_number: String,
    pub additional_information: String,
}

/// Where the loss happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LossLocation {
    SameAsReporter,
    SameAsInsured,
    Other(Address),
}

impl Default for LossLocation {
    fn default() -> Self {
        Self::SameAsReporter
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Loss {
    pub date: NaiveDate,
    pub description: String,
    pub location: LossLocation,
    pub authorities_notified: bool,
    pub authority: Option<AuthorityReport>,
    /// Ordered list; rendered as "Witness 1:", "Witness 2:", ...
    pub witnesses: Vec<Party>,
}

impl Loss {
    pub fn has_witnesses(&self) -> bool {
        !self.witnesses.is_empty()
    }
}

/// Everything the form collects, captured at submission time. There is no
/// server-side schema; unset fields stay as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSnapshot {
    pub reporter: Reporter,
    pub policy: Policy,
    pub loss: Loss,
    /// Ordered list; rendered as "Claimant 1:", "Claimant 2:", ...
    pub claimants: Vec<Party>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = FormSnapshot {
            reporter: Reporter {
                relation_to_insured: "Broker".to_string(),
                party: Party {
                    first_name: "Ada".to_string(),
                    last_name: "Lovelace".to_string(),
                    ..Party::default()
                },
            },
            policy: Policy {
                policy_number: "POL-123".to_string(),
                contact_same_as_reporter: true,
                ..Policy::default()
            },
            ..FormSnapshot::default()
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: FormSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.reporter.party.first_name, "Ada");
        assert_eq!(parsed.policy.policy_number, "POL-123");
        assert!(parsed.policy.contact_same_as_reporter);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let parsed: FormSnapshot =
            serde_json::from_str(r#"{"policy": {"policy_number": "P-1"}}"#).unwrap();
        assert_eq!(parsed.policy.policy_number, "P-1");
        assert!(parsed.reporter.party.first_name.is_empty());
        assert!(matches!(parsed.loss.location, LossLocation::SameAsReporter));
        assert!(parsed.claimants.is_empty());
    }
}
