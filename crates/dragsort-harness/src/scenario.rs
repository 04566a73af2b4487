//! Scenario files.
//!
//! A scenario names some lists, optionally groups them, and lists the drag
//! gestures to replay. TOML and JSON are accepted; the format is picked by
//! file extension (`.json` is JSON, anything else is TOML).
//!
//! ```toml
//! [lists]
//! todo = ["A", "B", "C", "D"]
//!
//! [[steps]]
//! drag = { list = "todo", from = 0, over = [1, 2] }
//!
//! [expect]
//! todo = ["B", "C", "A", "D"]
//! ```
//!
//! Lists not named in `groups` each get a group of their own, so drags never
//! cross them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use dragsort_core::SortableConfig;
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub lists: BTreeMap<String, Vec<String>>,
    /// Lists sharing one sortable group.
    #[serde(default)]
    pub groups: Vec<Vec<String>>,
    /// Elements bound to a non-member value, keyed by element name. The
    /// value names the list whose group the element joins.
    #[serde(default)]
    pub scalars: BTreeMap<String, String>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub expect: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub config: SortableConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// One full gesture over list elements.
    Drag(DragStep),
    /// Start a drag on a scalar-bound element.
    DragScalar { scalar: String },
    /// Append an item; its new element is attached like the others.
    Push { list: String, item: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DragStep {
    pub list: String,
    pub from: usize,
    /// Slots entered in order.
    #[serde(default)]
    pub over: Vec<usize>,
    /// List whose slots `over` refers to. Defaults to `list`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over_list: Option<String>,
    /// Release over the last target (`true`) or cancel with Escape.
    #[serde(default = "default_drop")]
    pub drop: bool,
}

const fn default_drop() -> bool {
    true
}

impl DragStep {
    #[must_use]
    pub fn target_list(&self) -> &str {
        self.over_list.as_deref().unwrap_or(&self.list)
    }
}

impl Scenario {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from disk, picking the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Check that every name refers to something and each list is in at
    /// most one group.
    pub fn validate(&self) -> Result<()> {
        if self.lists.is_empty() {
            return Err(HarnessError::invalid("scenario defines no lists"));
        }
        let known = |name: &str| -> Result<()> {
            if self.lists.contains_key(name) {
                Ok(())
            } else {
                Err(HarnessError::UnknownList(name.to_owned()))
            }
        };

        let mut grouped = BTreeSet::new();
        for group in &self.groups {
            for name in group {
                known(name)?;
                if !grouped.insert(name.as_str()) {
                    return Err(HarnessError::invalid(format!(
                        "list {name} appears in more than one group"
                    )));
                }
            }
        }
        for (scalar, owner) in &self.scalars {
            if self.lists.contains_key(scalar) {
                return Err(HarnessError::invalid(format!(
                    "scalar {scalar} shadows a list of the same name"
                )));
            }
            known(owner)?;
        }
        for step in &self.steps {
            match step {
                Step::Drag(drag) => {
                    known(&drag.list)?;
                    known(drag.target_list())?;
                }
                Step::DragScalar { scalar } => {
                    if !self.scalars.contains_key(scalar) {
                        return Err(HarnessError::UnknownScalar(scalar.clone()));
                    }
                }
                Step::Push { list, .. } => known(list)?,
            }
        }
        for name in self.expect.keys() {
            known(name)?;
        }
        Ok(())
    }

    /// Group index for every list, in list-name order for ungrouped lists.
    #[must_use]
    pub fn group_assignment(&self) -> BTreeMap<&str, usize> {
        let mut assignment = BTreeMap::new();
        for (index, group) in self.groups.iter().enumerate() {
            for name in group {
                assignment.insert(name.as_str(), index);
            }
        }
        let mut next = self.groups.len();
        for name in self.lists.keys() {
            if !assignment.contains_key(name.as_str()) {
                assignment.insert(name.as_str(), next);
                next += 1;
            }
        }
        assignment
    }
}
