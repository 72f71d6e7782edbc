//! Utility macros for reducing boilerplate

/// Implement `as_str`, `ALL`, `Display` and `FromStr` for a unit-only enum
/// whose wire form is a lowercase string.
///
/// Parsing trims and lowercases its input, so `" Running "` parses the same
/// as `"running"`.
///
/// # Example
/// ```ignore
/// impl_str_enum!(TaskStatus, "task status", {
///     Pending => "pending",
///     Running => "running",
/// });
/// ```
#[macro_export]
macro_rules! impl_str_enum {
    ($type:ident, $kind:literal, { $($variant:ident => $value:literal),+ $(,)? }) => {
        impl $type {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$type] = &[$($type::$variant),+];

            /// Wire representation of this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($type::$variant => $value,)+
                }
            }
        }

        impl ::std::fmt::Display for $type {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $type {
            type Err = $crate::EnumParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($value => Ok($type::$variant),)+
                    _ => Err($crate::EnumParseError::new($kind, s).with_expected($type::ALL)),
                }
            }
        }
    };
}
