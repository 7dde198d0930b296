use crate::db::DatabaseError;

/// Macro to generate a closed string enum with `as_str`, `FromStr` and
/// serde impls that use the same string form as the stores and forms.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            /// Case-insensitive lookup, used when importing external datasets.
            pub fn from_str_loose(s: &str) -> Option<Self> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(Role {
    Admin => "admin",
    Doctor => "doctor",
});

str_enum!(Gender {
    Male => "Male",
    Female => "Female",
    Other => "Other",
});

str_enum!(AllergySeverity {
    Mild => "Mild",
    Moderate => "Moderate",
    Severe => "Severe",
});

str_enum!(EverMarried {
    No => "No",
    Yes => "Yes",
});

str_enum!(WorkType {
    Children => "Children",
    GovtJob => "Govt_job",
    NeverWorked => "Never_worked",
    Private => "Private",
    SelfEmployed => "Self-employed",
});

str_enum!(ResidenceType {
    Rural => "Rural",
    Urban => "Urban",
});

str_enum!(SmokingStatus {
    FormerlySmoked => "Formerly smoked",
    NeverSmoked => "Never smoked",
    Smokes => "Smokes",
    Unknown => "Unknown",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parse_is_exact_and_case_sensitive() {
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert!(Role::from_str("Admin").is_err());
        assert!(Role::from_str("nurse").is_err());
        assert_eq!(WorkType::from_str("Self-employed").unwrap(), WorkType::SelfEmployed);
        assert!(AllergySeverity::from_str("Critical").is_err());
    }

    #[test]
    fn invalid_value_reports_field_name() {
        let err = Gender::from_str("Unknown").unwrap_err();
        assert!(err.to_string().contains("Gender"));
    }

    #[test]
    fn loose_lookup_ignores_case_and_padding() {
        assert_eq!(WorkType::from_str_loose("govt_job"), Some(WorkType::GovtJob));
        assert_eq!(
            SmokingStatus::from_str_loose(" formerly smoked "),
            Some(SmokingStatus::FormerlySmoked)
        );
        assert_eq!(ResidenceType::from_str_loose("Suburban"), None);
    }

    #[test]
    fn serde_uses_store_strings() {
        let json = serde_json::to_string(&SmokingStatus::NeverSmoked).unwrap();
        assert_eq!(json, "\"Never smoked\"");
        let back: WorkType = serde_json::from_str("\"Govt_job\"").unwrap();
        assert_eq!(back, WorkType::GovtJob);
        assert!(serde_json::from_str::<AllergySeverity>("\"mild\"").is_err());
    }
}
