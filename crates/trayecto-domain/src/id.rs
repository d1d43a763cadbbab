//! Opaque identifiers assigned by the backing store.

/// Declares a newtype identifier over the store's integer key.
macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier as delivered by the backing store
            pub fn from_value(value: i64) -> Self {
                Self(value)
            }

            /// Get the raw identifier
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|e| format!("Invalid {} '{}': {}", stringify!($name), s, e))
            }
        }
    };
}

pub(crate) use opaque_id;
