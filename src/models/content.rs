//! Typed access to a manifest's raw content tree
//!
//! Manifest bodies are kept as a generic YAML value because their shape varies
//! by kind. The helpers here walk a field path and either return the value in
//! the expected shape or a [`ContentError`] that names the path.

use serde_yaml::{Mapping, Value};

/// Error returned by the typed content accessors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("field '{0}' is missing")]
    Missing(String),

    #[error("field '{path}' is not a {expected}")]
    WrongShape { path: String, expected: &'static str },
}

pub type ContentResult<T> = std::result::Result<T, ContentError>;

/// Raw content of one decoded document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Content(Value);

impl Content {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Walk `path` through nested mappings
    pub fn get(&self, path: &[&str]) -> ContentResult<&Value> {
        let mut current = &self.0;
        for (depth, key) in path.iter().enumerate() {
            let map = current.as_mapping().ok_or_else(|| ContentError::WrongShape {
                path: dotted(&path[..depth]),
                expected: "mapping",
            })?;
            current = map
                .get(*key)
                .filter(|v| !v.is_null())
                .ok_or_else(|| ContentError::Missing(dotted(&path[..=depth])))?;
        }
        Ok(current)
    }

    /// Like [`Content::get`], but a missing field is `Ok(None)`
    pub fn get_optional(&self, path: &[&str]) -> ContentResult<Option<&Value>> {
        match self.get(path) {
            Ok(value) => Ok(Some(value)),
            Err(ContentError::Missing(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn str_at(&self, path: &[&str]) -> ContentResult<&str> {
        let value = self.get(path)?;
        value.as_str().ok_or_else(|| ContentError::WrongShape {
            path: dotted(path),
            expected: "string",
        })
    }

    /// Optional string lookup that treats a wrong shape as absent
    pub fn str_or_empty(&self, path: &[&str]) -> &str {
        self.str_at(path).unwrap_or("")
    }

    pub fn map_at(&self, path: &[&str]) -> ContentResult<&Mapping> {
        let value = self.get(path)?;
        value.as_mapping().ok_or_else(|| ContentError::WrongShape {
            path: dotted(path),
            expected: "mapping",
        })
    }

    pub fn seq_at(&self, path: &[&str]) -> ContentResult<&Vec<Value>> {
        let value = self.get(path)?;
        value.as_sequence().ok_or_else(|| ContentError::WrongShape {
            path: dotted(path),
            expected: "sequence",
        })
    }

    /// Sequence of strings; non-string entries are skipped
    pub fn str_list_at(&self, path: &[&str]) -> ContentResult<Vec<&str>> {
        Ok(self
            .seq_at(path)?
            .iter()
            .filter_map(Value::as_str)
            .collect())
    }

    /// String keys of a mapping, in document order
    pub fn map_keys_at(&self, path: &[&str]) -> ContentResult<Vec<&str>> {
        Ok(self
            .map_at(path)?
            .keys()
            .filter_map(Value::as_str)
            .collect())
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn dotted(path: &[&str]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(yaml: &str) -> Content {
        Content::new(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn test_str_at() {
        let c = content("spec:\n  path: ./clusters/prod\n");
        assert_eq!(c.str_at(&["spec", "path"]).unwrap(), "./clusters/prod");
    }

    #[test]
    fn test_missing_names_path() {
        let c = content("spec:\n  interval: 1m\n");
        assert_eq!(
            c.str_at(&["spec", "sourceRef", "name"]),
            Err(ContentError::Missing("spec.sourceRef".to_string()))
        );
        assert_eq!(c.get_optional(&["spec", "path"]).unwrap(), None);
    }

    #[test]
    fn test_wrong_shape() {
        let c = content("resources: app.yaml\n");
        let err = c.seq_at(&["resources"]).unwrap_err();
        assert_eq!(
            err,
            ContentError::WrongShape {
                path: "resources".to_string(),
                expected: "sequence"
            }
        );
        assert_eq!(err.to_string(), "field 'resources' is not a sequence");
    }

    #[test]
    fn test_null_is_missing() {
        let c = content("metadata:\n  namespace:\n");
        assert!(matches!(
            c.str_at(&["metadata", "namespace"]),
            Err(ContentError::Missing(_))
        ));
        assert_eq!(c.str_or_empty(&["metadata", "namespace"]), "");
    }

    #[test]
    fn test_lists_and_keys() {
        let c = content(
            "resources:\n  - a.yaml\n  - 3\n  - b.yaml\nsubstitute:\n  cluster_name: prod\n  region: eu\n",
        );
        assert_eq!(c.str_list_at(&["resources"]).unwrap(), vec!["a.yaml", "b.yaml"]);
        assert_eq!(
            c.map_keys_at(&["substitute"]).unwrap(),
            vec!["cluster_name", "region"]
        );
    }
}
