//! # errwrap-validate
//!
//! Translation of [`validator`] failures into a `field -> message` map
//! suitable for an API response body.
//!
//! ## Usage
//!
//! ```rust
//! use errwrap_validate::translate;
//! use validator::Validate;
//!
//! #[derive(Validate)]
//! struct SignUp {
//!     #[validate(length(min = 1, code = "required"))]
//!     user_name: String,
//!     #[validate(range(min = 18, code = "min"))]
//!     age: u32,
//! }
//!
//! errwrap_validate::schema! {
//!     SignUp {
//!         user_name as "userName",
//!         age,
//!     }
//! }
//!
//! let form = SignUp { user_name: String::new(), age: 17 };
//! let err = form.validate().unwrap_err();
//! let map = translate(&err, &form);
//! assert_eq!(map["userName"], "is required");
//! assert_eq!(map["age"], "must be greater than 18");
//! ```
//!
//! Records are validated with `#[derive(Validate)]`. The failure's `code` is
//! the rule name looked up in the [`Translator`], and the parameter of the
//! same name (`min` for `range(min = 18, code = "min")`) is passed to the
//! message builder. External field names come from the static table
//! generated by [`schema!`]; no runtime reflection is involved. Errors that
//! are not validation failures translate to an empty map.

mod schema;
mod translate;

pub use schema::{FieldSpec, Schema};
pub use translate::{FieldErrorMap, MessageFn, Translator, translate, translate_result};
