/// Generate `as_str`, `ALL`, `Display`, `FromStr`, `From<T> for String` and
/// `TryFrom<String> for T` for a closed enum whose variants map to fixed keys.
///
/// Unknown keys are an error. Pair with
/// `#[serde(into = "String", try_from = "String")]` on the enum for serde.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($str => Ok($name::$variant),)+
                    other => Err(format!("unknown {}: {other}", stringify!($name))),
                }
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> Self {
                v.as_str().to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }
    };
}

/// Same as [`string_enum!`] but for an open enum with a `Custom(String)`
/// fallback: unknown keys become `Custom`, empty keys are an error.
macro_rules! string_enum_open {
    ($name:ident, $label:expr, { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $str,)+
                    $name::Custom(s) => s,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    $($str => $name::$variant,)+
                    other => $name::Custom(other.to_string()),
                }
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> Self {
                match v {
                    $name::Custom(s) => s,
                    other => other.as_str().to_string(),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                if s.is_empty() {
                    return Err(format!("{} cannot be empty", $label));
                }
                Ok($name::from(s.as_str()))
            }
        }
    };
}
