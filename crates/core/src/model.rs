use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a leaf among the laid-out leaves of one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeafId(pub usize);

impl fmt::Display for LeafId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A leaf value as it appears in dataset files: published datasets mix JSON
/// numbers and numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

/// One record of a nested dataset, exactly as deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RawRecord>>,
}

impl RawRecord {
    pub fn leaf(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            category: None,
            value: Some(RawValue::Number(value)),
            children: None,
        }
    }

    pub fn group(name: impl Into<String>, children: Vec<RawRecord>) -> Self {
        Self {
            name: name.into(),
            category: None,
            value: None,
            children: Some(children),
        }
    }

    pub fn has_children(&self) -> bool {
        self.children.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// A dataset selected by the surrounding application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub data: RawRecord,
}

/// Weighted tree node produced by [`crate::hierarchy::build`].
///
/// Children are ordered by descending weight. For internal nodes `weight` is
/// the sum of the children's weights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub name: String,
    /// Name of the top-level group this node belongs to.
    pub category: String,
    pub weight: f64,
    pub children: Vec<Node>,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Leaves in pre-order, the order tiles are laid out and numbered in.
    pub fn leaves(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                out.push(node);
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }
}
