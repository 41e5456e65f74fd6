//! Newtype IDs for type-safe catalog and order references.
//!
//! Catalog entries are addressed by human-readable slugs (`"ultra-matte"`,
//! `"harbor-blue"`), so every ID wraps a `String`. Use the `define_id!` macro
//! to create wrappers that prevent accidentally mixing a color ID with a
//! finish ID.

/// Macro to define a type-safe, string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<&str>`, `From<String>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use paintshop_core::define_id;
/// define_id!(ColorId);
/// define_id!(FinishId);
///
/// let color = ColorId::new("harbor-blue");
/// let finish = FinishId::new("eggshell");
///
/// // These are different types, so this won't compile:
/// // let _: ColorId = finish;
/// assert_eq!(color.as_str(), "harbor-blue");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Catalog
define_id!(ProductId);
define_id!(ColorId);
define_id!(FinishId);
define_id!(ShippingOptionId);

// Orders and after-sales
define_id!(OrderId);
define_id!(ReturnId);
