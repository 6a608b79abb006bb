//! Turning validation failures into field-level messages for API responses.

use std::collections::{BTreeMap, HashMap};
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, LazyLock};

use serde_json::Value;
use validator::{ValidationError, ValidationErrors};

use crate::schema::Schema;

/// Field external name to message.
pub type FieldErrorMap = BTreeMap<String, String>;

/// Builds the message for a failed rule from the rule's parameter.
pub type MessageFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

static DEFAULT_TRANSLATOR: LazyLock<Translator> = LazyLock::new(Translator::new);

/// Maps rule names to message builders and applies them to validation
/// failures.
#[derive(Clone)]
pub struct Translator {
    messages: HashMap<String, MessageFn>,
}

impl Translator {
    /// Create a translator with the built-in messages for `required` and `min`.
    pub fn new() -> Self {
        Self::empty()
            .with_rule("required", |_| "is required".to_string())
            .with_rule("min", |param| format!("must be greater than {param}"))
    }

    /// Create a translator without any rule messages.
    ///
    /// Every failure gets the generic fallback message.
    pub fn empty() -> Self {
        Self {
            messages: HashMap::new(),
        }
    }

    /// Register the message builder for `rule`, replacing any previous one.
    pub fn with_rule<F>(mut self, rule: impl Into<String>, message: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.messages.insert(rule.into(), Arc::new(message));
        self
    }

    /// Add every rule of `other`, which wins on conflicts.
    pub fn merge(mut self, other: &Translator) -> Self {
        for (rule, message) in &other.messages {
            self.messages.insert(rule.clone(), Arc::clone(message));
        }
        self
    }

    /// Whether a message builder is registered for `rule`
    pub fn has_rule(&self, rule: &str) -> bool {
        self.messages.contains_key(rule)
    }

    /// Build the message for a failure of `rule` with parameter `param`.
    pub fn message(&self, rule: &str, param: &str) -> String {
        match self.messages.get(rule) {
            Some(message) => message(param),
            None => format!("validation failed on '{rule}' condition"),
        }
    }

    /// Map the validation failures carried by `err` to messages keyed by the
    /// external field names of `record`.
    ///
    /// `err` may hold the [`ValidationErrors`] anywhere in its `source()`
    /// chain. Any other error yields an empty map. Only the first failure of
    /// each field is reported. Failures naming a field the record does not
    /// declare are keyed by that name with an `Unknown field` message.
    #[tracing::instrument(skip_all)]
    pub fn translate(&self, err: &(dyn StdError + 'static), record: &dyn Schema) -> FieldErrorMap {
        let mut map = FieldErrorMap::new();

        let Some(errors) = errwrap::find::<ValidationErrors>(err) else {
            tracing::trace!("no validation errors in chain");
            return map;
        };

        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (field, failures) in fields {
            let field: &str = &field;
            let Some(failure) = failures.first() else {
                continue;
            };

            let Some(spec) = record.field(field) else {
                tracing::debug!(field, record = record.type_name(), "unknown field");
                map.insert(field.to_string(), format!("Unknown field: {field}"));
                continue;
            };

            let key = spec.external_name().into_owned();
            let rule: &str = &failure.code;
            let message = self.message(rule, &rule_param(failure));
            tracing::trace!(%key, rule, "translated field failure");
            map.insert(key, message);
        }

        map
    }

    /// Like [`translate`](Self::translate) for the error side of a result;
    /// `Ok` yields an empty map.
    pub fn translate_result<T, E>(&self, result: &Result<T, E>, record: &dyn Schema) -> FieldErrorMap
    where
        E: StdError + 'static,
    {
        match result {
            Ok(_) => FieldErrorMap::new(),
            Err(err) => self.translate(err, record),
        }
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rules: Vec<_> = self.messages.keys().collect();
        rules.sort();
        f.debug_struct("Translator").field("rules", &rules).finish()
    }
}

/// The parameter named after the failed rule, rendered as text.
///
/// `range(min = 18, code = "min")` yields `"18"`. Rules without such a
/// parameter yield an empty string.
fn rule_param(failure: &ValidationError) -> String {
    match failure.params.get(&*failure.code) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => {
            if let Some(n) = number.as_i64() {
                n.to_string()
            } else if let Some(n) = number.as_u64() {
                n.to_string()
            } else {
                match number.as_f64() {
                    Some(n) if n.is_finite() && n.fract() == 0.0 => format!("{n:.0}"),
                    _ => number.to_string(),
                }
            }
        }
        Some(other) => other.to_string(),
    }
}

/// Translate with the built-in messages. See [`Translator::translate`].
pub fn translate(err: &(dyn StdError + 'static), record: &dyn Schema) -> FieldErrorMap {
    DEFAULT_TRANSLATOR.translate(err, record)
}

/// Translate a result with the built-in messages. See
/// [`Translator::translate_result`].
pub fn translate_result<T, E>(result: &Result<T, E>, record: &dyn Schema) -> FieldErrorMap
where
    E: StdError + 'static,
{
    DEFAULT_TRANSLATOR.translate_result(result, record)
}
