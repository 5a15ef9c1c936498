use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }
    };
}

string_id!(ProviderId, "Unique identifier for a registered compute provider.");
string_id!(TaskId, "Unique identifier for a submitted task.");
string_id!(DeviceId, "Unique identifier for a GPU device under attestation.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_is_detected() {
        assert!(TaskId::new("").is_empty());
        assert!(!TaskId::new("t-1").is_empty());
    }

    #[test]
    fn ids_compare_by_value() {
        assert_eq!(ProviderId::from("p1"), ProviderId::new("p1".to_string()));
        assert_ne!(ProviderId::from("p1"), ProviderId::from("p2"));
    }
}
