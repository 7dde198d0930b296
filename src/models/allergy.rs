use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::AllergySeverity;

/// An allergy document as read back from the document store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allergy {
    pub id: String,
    pub patient_id: i64,
    pub allergen: String,
    pub severity: AllergySeverity,
    pub date_added: NaiveDate,
}

/// Document body stored for an allergy (the id lives outside the body).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAllergy {
    pub patient_id: i64,
    pub allergen: String,
    pub severity: AllergySeverity,
    pub date_added: NaiveDate,
}

impl NewAllergy {
    pub(crate) fn with_id(self, id: String) -> Allergy {
        Allergy {
            id,
            patient_id: self.patient_id,
            allergen: self.allergen,
            severity: self.severity,
            date_added: self.date_added,
        }
    }
}

/// Mutable allergy fields; the owning patient never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct AllergyChanges {
    pub allergen: String,
    pub severity: AllergySeverity,
    pub date_added: NaiveDate,
}
