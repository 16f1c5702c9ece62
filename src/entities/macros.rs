//! Macros for reducing boilerplate when declaring resources
//!
//! `impl_resource!` generates the struct, its [`Entity`] and [`Resource`]
//! implementations, and the declared tables those traits expose: the field
//! list used by whole-object replace, per-field decoding for patch,
//! structural validation, and the relationship accessor table.
//!
//! [`Entity`]: crate::core::entity::Entity
//! [`Resource`]: crate::core::entity::Resource

/// Declare a resource type
///
/// # Example
///
/// ```rust,ignore
/// use restbase::prelude::*;
///
/// impl_resource!(
///     Parent,
///     singular: "parent",
///     fields: {
///         name: String,
///         nickname: Option<String>,
///     },
///     relations: {
///         children: many,
///         favourite: single,
///     }
/// );
///
/// let parent = Parent::new("p1".to_string(), None);
/// assert!(parent.children.is_empty());
/// assert_eq!(Parent::resource_name(), "parents");
/// ```
///
/// The plural label is derived with [`Pluralizer`](crate::core::pluralize::Pluralizer)
/// unless given explicitly with `plural: "..."` after the singular label.
/// `many` relationships are stored as `Vec<Uuid>`, `single` ones as
/// `Option<Uuid>`; both default to empty when absent from a payload.
#[macro_export]
macro_rules! impl_resource {
    (
        $type:ident,
        singular: $singular:literal,
        $( plural: $plural:literal, )?
        fields: {
            $( $field:ident : $field_ty:ty ),* $(,)?
        }
        $(, relations: {
            $( $rel:ident : $card:ident ),* $(,)?
        } )?
        $(,)?
    ) => {
        #[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $type {
            /// Identity and lifecycle fields
            #[serde(flatten)]
            pub meta: $crate::core::entity::EntityMeta,

            $( pub $field : $field_ty, )*

            $($(
                #[serde(default)]
                pub $rel : $crate::__relation_type!($card),
            )*)?
        }

        impl $crate::core::entity::Entity for $type {
            fn resource_name() -> &'static str {
                $crate::__resource_plural!($singular $(, $plural)?)
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn meta(&self) -> &$crate::core::entity::EntityMeta {
                &self.meta
            }

            fn meta_mut(&mut self) -> &mut $crate::core::entity::EntityMeta {
                &mut self.meta
            }
        }

        impl $crate::core::entity::Resource for $type {
            fn field_names() -> &'static [&'static str] {
                &[ $( stringify!($field) ),* ]
            }

            fn relation_keys() -> &'static [&'static str] {
                &[ $($( stringify!($rel) ),*)? ]
            }

            fn replace_fields(&mut self, source: Self) {
                let Self {
                    $( $field, )*
                    $($( $rel, )*)?
                    ..
                } = source;
                $( self.$field = $field; )*
                $($( self.$rel = $rel; )*)?
            }

            fn apply_field(
                &mut self,
                name: &str,
                value: ::serde_json::Value,
            ) -> ::std::result::Result<(), $crate::core::field::FieldError> {
                match name {
                    $(
                        n if n == stringify!($field) => {
                            self.$field = $crate::core::field::decode_field(n, value)?;
                        }
                    )*
                    $($(
                        n if n == stringify!($rel) => {
                            self.$rel = $crate::core::field::decode_field(n, value)?;
                        }
                    )*)?
                    other => {
                        return Err($crate::core::field::FieldError::Unknown(other.to_string()));
                    }
                }
                Ok(())
            }

            fn validate_fields(
                object: &::serde_json::Map<String, ::serde_json::Value>,
            ) -> $crate::core::field::FieldErrors {
                let mut errors = $crate::core::field::FieldErrors::new();
                $crate::core::entity::EntityMeta::validate_fields(object, &mut errors);
                $(
                    $crate::core::field::check_field::<$field_ty>(
                        object,
                        stringify!($field),
                        &mut errors,
                    );
                )*
                $($(
                    $crate::core::field::check_defaulted_field::<$crate::__relation_type!($card)>(
                        object,
                        stringify!($rel),
                        &mut errors,
                    );
                )*)?
                $crate::core::field::reject_unknown(
                    object,
                    &[
                        $crate::core::entity::SERVER_CONTROLLED_FIELDS,
                        <Self as $crate::core::entity::Resource>::field_names(),
                        <Self as $crate::core::entity::Resource>::relation_keys(),
                    ],
                    &mut errors,
                );
                errors
            }

            fn relation_accessor(
                key: &str,
            ) -> ::std::option::Option<$crate::core::relation::RelationAccessor<Self>> {
                match key {
                    $($(
                        k if k == stringify!($rel) => {
                            Some($crate::core::relation::RelationAccessor {
                                cardinality: <$crate::__relation_type!($card)
                                    as $crate::core::relation::RelationField>::CARDINALITY,
                                get: |p: &Self| {
                                    $crate::core::relation::RelationField::to_relation(&p.$rel)
                                },
                                set: |p: &mut Self, value: $crate::core::relation::RelationValue| {
                                    p.$rel = <$crate::__relation_type!($card)
                                        as $crate::core::relation::RelationField>::from_relation(value);
                                },
                            })
                        }
                    )*)?
                    _ => None,
                }
            }
        }

        impl $type {
            /// Create an unsaved instance; relationships start empty
            #[allow(clippy::too_many_arguments)]
            pub fn new($( $field: $field_ty ),*) -> Self {
                Self {
                    meta: $crate::core::entity::EntityMeta::default(),
                    $( $field, )*
                    $($( $rel: ::std::default::Default::default(), )*)?
                }
            }
        }
    };
}

/// Rust type of a relationship attribute for a cardinality keyword
#[doc(hidden)]
#[macro_export]
macro_rules! __relation_type {
    (many) => {
        ::std::vec::Vec<::uuid::Uuid>
    };
    (single) => {
        ::std::option::Option<::uuid::Uuid>
    };
}

/// Plural envelope label: explicit, or derived from the singular
#[doc(hidden)]
#[macro_export]
macro_rules! __resource_plural {
    ($singular:literal) => {{
        static PLURAL: ::std::sync::OnceLock<String> = ::std::sync::OnceLock::new();
        PLURAL
            .get_or_init(|| $crate::core::pluralize::Pluralizer::pluralize($singular))
            .as_str()
    }};
    ($singular:literal, $plural:literal) => {
        $plural
    };
}
