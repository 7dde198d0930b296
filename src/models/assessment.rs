use serde::{Deserialize, Serialize};

use super::enums::{EverMarried, ResidenceType, SmokingStatus, WorkType};

/// A stroke-risk observation. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub id: String,
    #[serde(flatten)]
    pub data: NewAssessment,
}

/// Document body stored for an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAssessment {
    pub patient_id: i64,
    #[serde(with = "flag")]
    pub hypertension: bool,
    pub ever_married: EverMarried,
    pub work_type: WorkType,
    pub residence_type: ResidenceType,
    pub avg_glucose_level: f64,
    pub bmi: f64,
    pub smoking_status: SmokingStatus,
    #[serde(with = "flag")]
    pub stroke: bool,
}

/// Boolean clinical flags are persisted as 0/1 integers.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(serde::de::Error::custom(format!("flag must be 0 or 1, got {other}"))),
        }
    }
}
