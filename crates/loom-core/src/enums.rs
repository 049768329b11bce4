//! Small closed-set enums used throughout the engine.
//!
//! [`EventType`] keeps the teacher's string-backed-enum-with-custom-
//! fallback pattern (`define_enum!`), since the event log is append-only
//! and forward compatibility with event kinds not yet known to this
//! binary matters. [`Category`] and [`Enforcement`] are genuinely closed
//! sets fixed by the data model and use a plain derive instead; issue
//! `status` and `type` are free-form strings validated against a loaded
//! [`crate::template::TypeTemplate`], not enums.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Macro: defines an enum with known string variants + a Custom(String) fallback.
// ---------------------------------------------------------------------------
macro_rules! define_enum {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident, custom_variant = $custom_variant:ident,
        variants: [
            $( ($variant:ident, $str:expr) ),+ $(,)?
        ]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant, )+
            $custom_variant(String),
        }

        impl $name {
            /// Returns the string representation.
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $str, )+
                    Self::$custom_variant(s) => s.as_str(),
                }
            }

            /// Returns `true` if this is the default variant.
            pub fn is_default(&self) -> bool {
                *self == Self::$default
            }

            /// Returns `true` if this is a built-in (non-custom) variant.
            pub fn is_builtin(&self) -> bool {
                !matches!(self, Self::$custom_variant(_))
            }

            /// Returns `true` if this is a known valid variant or any non-empty custom string.
            pub fn is_valid(&self) -> bool {
                match self {
                    Self::$custom_variant(s) => !s.is_empty(),
                    _ => true,
                }
            }

            /// Returns `true` if this is valid, also accepting the given custom values.
            pub fn is_valid_with_custom(&self, custom_values: &[&str]) -> bool {
                if self.is_builtin() {
                    return true;
                }
                if let Self::$custom_variant(s) = self {
                    return custom_values.contains(&s.as_str());
                }
                false
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::from(s.as_str()))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    $( $str => Self::$variant, )+
                    other => Self::$custom_variant(other.to_owned()),
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                // Check known variants first to avoid allocation in common case.
                match s.as_str() {
                    $( $str => Self::$variant, )+
                    _ => Self::$custom_variant(s),
                }
            }
        }
    };
}

// ===========================================================================
// EventType
// ===========================================================================

define_enum! {
    /// An audit-trail entry kind.
    EventType, default = Created, custom_variant = Other,
    variants: [
        (Created, "created"),
        (Updated, "updated"),
        (StatusChanged, "status_changed"),
        (Claimed, "claimed"),
        (Released, "released"),
        (TransitionWarning, "transition_warning"),
        (Commented, "comment_added"),
        (LabelAdded, "label_added"),
        (LabelRemoved, "label_removed"),
        (DependencyAdded, "dependency_added"),
        (DependencyRemoved, "dependency_removed"),
        (Closed, "closed"),
        (Reopened, "reopened"),
    ]
}

// ===========================================================================
// Category
// ===========================================================================

/// The three-way status bucket every workflow state maps to. Fixed by the
/// data model -- unlike [`EventType`] this set never grows, so it is a
/// plain enum rather than a string-backed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Open,
    Wip,
    Done,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Open => "open",
            Category::Wip => "wip",
            Category::Done => "done",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Category::Open),
            "wip" => Ok(Category::Wip),
            "done" => Ok(Category::Done),
            _ => Err(()),
        }
    }
}

// ===========================================================================
// Enforcement
// ===========================================================================

/// How strictly a transition enforces its `requires_fields`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enforcement {
    Hard,
    Soft,
    /// No template is loaded for this type; legacy tolerance applies.
    None,
}

impl Enforcement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Enforcement::Hard => "hard",
            Enforcement::Soft => "soft",
            Enforcement::None => "none",
        }
    }
}

impl fmt::Display for Enforcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_default_is_created() {
        assert_eq!(EventType::default(), EventType::Created);
        assert!(EventType::Created.is_default());
        assert!(!EventType::Closed.is_default());
    }

    #[test]
    fn event_type_roundtrip_serde() {
        let e = EventType::StatusChanged;
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, r#""status_changed""#);
        let back: EventType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn event_type_custom_fallback() {
        let json = r#""something_new""#;
        let e: EventType = serde_json::from_str(json).unwrap();
        assert_eq!(e, EventType::Other("something_new".into()));
        assert_eq!(serde_json::to_string(&e).unwrap(), json);
    }

    #[test]
    fn category_from_str() {
        assert_eq!("open".parse::<Category>(), Ok(Category::Open));
        assert_eq!("wip".parse::<Category>(), Ok(Category::Wip));
        assert_eq!("done".parse::<Category>(), Ok(Category::Done));
        assert!("bogus".parse::<Category>().is_err());
    }

    #[test]
    fn category_roundtrip_serde() {
        let c = Category::Wip;
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#""wip""#);
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn enforcement_display() {
        assert_eq!(Enforcement::Hard.to_string(), "hard");
        assert_eq!(Enforcement::Soft.to_string(), "soft");
        assert_eq!(Enforcement::None.to_string(), "none");
    }
}
