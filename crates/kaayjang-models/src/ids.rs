//! Strongly-typed ID newtypes for domain entities.
//!
//! Identifiers are opaque text tokens. Wrapping them per entity prevents
//! passing a `TrackId` where a `LevelId` is expected.
//!
//! # Example
//!
//! ```ignore
//! use kaayjang_models::ids::{LevelId, TrackId};
//!
//! fn get_level(id: &LevelId) { /* ... */ }
//!
//! let level_id = LevelId::from("clx0level");
//! get_level(&level_id);    // OK
//! // get_level(&TrackId::from("clx0track")); // Compile error! Type mismatch.
//! ```

use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use utoipa::ToSchema;

/// Macro to define a strongly-typed ID newtype.
///
/// This macro generates a newtype wrapper around `String` with all necessary
/// trait implementations for database operations, serialization, and API documentation.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        #[schema(value_type = String)]
        pub struct $name(pub String);

        impl $name {
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        // SQLx Type implementation for Postgres
        impl Type<sqlx::Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <String as Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        // SQLx Encode implementation
        impl<'q> Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <String as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        // SQLx Decode implementation
        impl<'r> Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                <String as Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
            }
        }

        // SQLx array type support for Postgres
        impl PgHasArrayType for $name {
            fn array_type_info() -> PgTypeInfo {
                <String as PgHasArrayType>::array_type_info()
            }
        }
    };
}

define_id!(
    /// Identifier of a Level (niveau).
    LevelId
);

define_id!(
    /// Identifier of a Track (filière).
    TrackId
);

define_id!(
    /// Identifier of a Class (classe).
    ClassId
);

define_id!(
    /// Identifier of a Student (étudiant).
    StudentId
);
