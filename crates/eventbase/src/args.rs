use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Index;

static NULL: Value = Value::Null;

/// Argument list passed to listeners on dispatch.
///
/// Missing positions read as `Value::Null`, the same way `serde_json::Value`
/// indexing behaves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Args(Vec<Value>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.0.push(value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }

    /// Call signature seen by wildcard listeners: the event name followed by
    /// the original arguments.
    pub fn with_event(&self, event: &str) -> Self {
        let mut values = Vec::with_capacity(self.0.len() + 1);
        values.push(Value::String(event.to_string()));
        values.extend(self.0.iter().cloned());
        Self(values)
    }
}

impl Index<usize> for Args {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        self.0.get(index).unwrap_or(&NULL)
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl From<()> for Args {
    fn from(_: ()) -> Self {
        Self::new()
    }
}

impl FromIterator<Value> for Args {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Args {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Build an [`Args`] list from values convertible into `serde_json::Value`.
///
/// ```
/// use eventbase::args;
///
/// let args = args!["ping", 5, true];
/// assert_eq!(args.len(), 3);
/// assert_eq!(args[1], 5);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Args::from(::std::vec![$($crate::Value::from($value)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_macro() {
        let args = args!["foo", 1, 2.5, false];
        assert_eq!(args.len(), 4);
        assert_eq!(args[0], "foo");
        assert_eq!(args[1], 1);
        assert_eq!(args[2], 2.5);
        assert_eq!(args[3], false);

        let empty = args![];
        assert!(empty.is_empty());
    }

    #[test]
    fn test_with_event_prepends_name() {
        let args = args![1, 2];
        let wildcard = args.with_event("foo");

        assert_eq!(wildcard, args!["foo", 1, 2]);
        assert_eq!(args, args![1, 2]);
    }

    #[test]
    fn test_missing_index_is_null() {
        let args = args![7];
        assert_eq!(args[0], 7);
        assert!(args[3].is_null());
        assert!(args.get(3).is_none());
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let args = args!["a", 1];
        let json = serde_json::to_string(&args).unwrap();
        assert_eq!(json, r#"["a",1]"#);

        let back: Args = serde_json::from_str(&json).unwrap();
        assert_eq!(back, args);
    }
}
