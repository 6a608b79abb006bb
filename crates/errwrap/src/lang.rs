//! Languages for user-facing error messages

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// A language tag an error message can be localized into.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    /// English
    En,
    /// Persian
    Fa,
}

impl Lang {
    /// Returns the language tag as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

/// Localized message table keyed by language.
pub type Messages = BTreeMap<Lang, String>;

static DEFAULT_MESSAGES: LazyLock<Messages> = LazyLock::new(|| {
    BTreeMap::from([
        (Lang::Fa, "یک خطای غیرمنتظره رخ داده است".to_string()),
        (Lang::En, "An unexpected error has occurred".to_string()),
    ])
});

/// The generic message set attached to errors wrapped without a config.
pub fn default_messages() -> &'static Messages {
    &DEFAULT_MESSAGES
}
