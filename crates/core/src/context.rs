use std::{
    any::{Any, type_name},
    collections::HashMap,
    sync::Arc,
};

use crate::error::{Result, ScriptlineError};

/// Key every command also writes its output under, so the last stage's result
/// is always reachable without knowing its name.
pub const CTX_OUT: &str = "__OUT__";

/// An error reported by a named stage. Accumulated, never thrown.
#[derive(Debug)]
pub struct StageError {
    pub stage: String,
    pub error: ScriptlineError,
}

/// Named values shared between pipeline stages, plus the errors they reported.
#[derive(Default)]
pub struct Context {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
    errors: Vec<StageError>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Arc::new(value));
    }

    /// Store an already shared value, e.g. one also published under [`CTX_OUT`].
    pub fn set_shared<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: Arc<T>) {
        self.values.insert(key.into(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref::<T>()
    }

    pub fn get_shared<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        Arc::clone(self.values.get(key)?).downcast::<T>().ok()
    }

    /// Like [`Context::get`] but tells apart a missing key from a mistyped one.
    pub fn expect<T: Any>(&self, key: &str) -> Result<&T> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ScriptlineError::MissingValue {
                key: key.to_string(),
            })?;

        value
            .downcast_ref::<T>()
            .ok_or_else(|| ScriptlineError::UnexpectedType {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    pub fn expect_shared<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ScriptlineError::MissingValue {
                key: key.to_string(),
            })?;

        Arc::clone(value)
            .downcast::<T>()
            .map_err(|_| ScriptlineError::UnexpectedType {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    pub fn add_error(&mut self, stage: impl Into<String>, error: ScriptlineError) {
        self.errors.push(StageError {
            stage: stage.into(),
            error,
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[StageError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<StageError> {
        self.errors
    }

    pub fn errors_for<'a>(&'a self, stage: &'a str) -> impl Iterator<Item = &'a StageError> + 'a {
        self.errors.iter().filter(move |e| e.stage == stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_get_round_trips_and_rejects_other_types() {
        let mut ctx = Context::new();
        ctx.set("length", 120u32);

        assert_eq!(ctx.get::<u32>("length"), Some(&120));
        assert!(ctx.get::<String>("length").is_none());
        assert!(ctx.get::<u32>("missing").is_none());
    }

    #[test]
    fn expect_distinguishes_missing_and_mistyped() {
        let mut ctx = Context::new();
        ctx.set("length", 120u32);

        assert!(matches!(
            ctx.expect::<u32>("nope"),
            Err(ScriptlineError::MissingValue { .. })
        ));
        assert!(matches!(
            ctx.expect::<String>("length"),
            Err(ScriptlineError::UnexpectedType { .. })
        ));
    }

    #[test]
    fn shared_values_are_not_copied() {
        let mut ctx = Context::new();
        let value = Arc::new(vec![1, 2, 3]);
        ctx.set_shared("a", Arc::clone(&value));
        ctx.set_shared(CTX_OUT, Arc::clone(&value));

        let a = ctx.get_shared::<Vec<i32>>("a").unwrap();
        let out = ctx.get_shared::<Vec<i32>>(CTX_OUT).unwrap();
        assert!(Arc::ptr_eq(&a, &out));
    }

    #[test]
    fn errors_accumulate_per_stage() {
        let mut ctx = Context::new();
        assert!(!ctx.has_errors());

        ctx.add_error(
            "extract",
            ScriptlineError::MissingValue {
                key: "summary".to_string(),
            },
        );
        ctx.add_error(
            "assemble",
            ScriptlineError::LostOutcomes {
                missing: 1,
                dispatched: 2,
            },
        );

        assert!(ctx.has_errors());
        assert_eq!(ctx.errors().len(), 2);
        assert_eq!(ctx.errors_for("extract").count(), 1);
    }
}
