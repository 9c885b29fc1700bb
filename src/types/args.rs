use std::collections::HashMap;

use super::SqlValue;

/// Arguments substituted into a SQL template.
///
/// `Positional` values fill `?` markers in order; `Named` values fill
/// `:name` markers.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Args {
    #[default]
    None,
    Positional(Vec<SqlValue>),
    Named(HashMap<String, SqlValue>),
}

impl Args {
    pub fn none() -> Self {
        Args::None
    }

    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        Args::Positional(values.into_iter().map(Into::into).collect())
    }

    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<SqlValue>,
    {
        Args::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns true when there is nothing to substitute.
    pub fn is_empty(&self) -> bool {
        match self {
            Args::None => true,
            Args::Positional(values) => values.is_empty(),
            Args::Named(values) => values.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Args::None => 0,
            Args::Positional(values) => values.len(),
            Args::Named(values) => values.len(),
        }
    }
}

impl From<()> for Args {
    fn from(_: ()) -> Self {
        Args::None
    }
}

impl From<Vec<SqlValue>> for Args {
    fn from(values: Vec<SqlValue>) -> Self {
        Args::Positional(values)
    }
}

impl From<&[SqlValue]> for Args {
    fn from(values: &[SqlValue]) -> Self {
        Args::Positional(values.to_vec())
    }
}

impl<const N: usize> From<[SqlValue; N]> for Args {
    fn from(values: [SqlValue; N]) -> Self {
        Args::Positional(values.into())
    }
}

impl From<HashMap<String, SqlValue>> for Args {
    fn from(values: HashMap<String, SqlValue>) -> Self {
        Args::Named(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_args() {
        assert!(Args::none().is_empty());
        assert!(Args::from(()).is_empty());
        assert!(Args::positional(Vec::<i32>::new()).is_empty());
        assert!(!Args::positional([1, 2]).is_empty());
    }

    #[test]
    fn test_named_args_convert_values() {
        let args = Args::named([("id", 7)]);
        match args {
            Args::Named(map) => assert_eq!(map.get("id"), Some(&SqlValue::Int32(7))),
            _ => panic!("Expected named args"),
        }
    }
}
