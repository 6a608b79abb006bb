//! Static field metadata for validated records.

use std::borrow::Cow;

/// Describes one field of a record: its internal name and the name it is
/// serialized under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    name: &'static str,
    rename: Option<&'static str>,
}

impl FieldSpec {
    /// Create a field description.
    pub const fn new(name: &'static str, rename: Option<&'static str>) -> Self {
        Self { name, rename }
    }

    /// Get the internal field name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get the declared serialization name, if any
    pub fn rename(&self) -> Option<&'static str> {
        self.rename
    }

    /// The name this field is exposed under: the declared serialization name,
    /// or the lowercased internal name.
    pub fn external_name(&self) -> Cow<'static, str> {
        match self.rename {
            Some(rename) if !rename.is_empty() => Cow::Borrowed(rename),
            _ => Cow::Owned(self.name.to_lowercase()),
        }
    }
}

/// A record type that can describe its own fields.
pub trait Schema {
    /// Name used in diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// All fields, in declaration order.
    fn fields(&self) -> &'static [FieldSpec];

    /// Look up a field by its internal name.
    fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|spec| spec.name == name)
    }
}

/// Implement [`Schema`] for a struct.
///
/// Each entry names a struct field and, optionally, the name it is
/// serialized under:
///
/// ```rust
/// struct SignUp {
///     user_name: String,
///     age: u32,
/// }
///
/// errwrap_validate::schema! {
///     SignUp {
///         user_name as "userName",
///         age,
///     }
/// }
///
/// use errwrap_validate::Schema;
/// let form = SignUp { user_name: String::new(), age: 0 };
/// assert_eq!(form.fields().len(), 2);
/// assert_eq!(form.field("user_name").unwrap().external_name(), "userName");
/// assert_eq!(form.field("age").unwrap().external_name(), "age");
/// ```
#[macro_export]
macro_rules! schema {
    (
        $ty:ident {
            $( $field:ident $( as $rename:literal )? ),* $(,)?
        }
    ) => {
        impl $crate::Schema for $ty {
            fn type_name(&self) -> &'static str {
                ::std::stringify!($ty)
            }

            fn fields(&self) -> &'static [$crate::FieldSpec] {
                const FIELDS: &[$crate::FieldSpec] = &[
                    $(
                        $crate::FieldSpec::new(
                            ::std::stringify!($field),
                            $crate::schema!(@rename $($rename)?),
                        ),
                    )*
                ];
                FIELDS
            }
        }
    };
    (@rename) => {
        None
    };
    (@rename $rename:literal) => {
        Some($rename)
    };
}
