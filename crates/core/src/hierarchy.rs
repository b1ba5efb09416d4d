use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::model::{Node, RawRecord};

/// Turn a raw nested record into a weighted tree.
///
/// Leaf weights come from `value`; internal weights are the sum of their
/// children, ignoring any `value` an internal record carries. Children are
/// stably sorted by descending weight at every level. Leaves take the name of
/// their top-level ancestor as category.
pub fn build(raw: &RawRecord) -> Result<Node> {
    let root = if raw.has_children() {
        build_group(raw, &raw.name, None)?
    } else {
        // A lone leaf is its own top-level group.
        let category = raw.category.clone().unwrap_or_else(|| raw.name.clone());
        build_leaf(raw, &raw.name, category)?
    };
    tracing::debug!(
        "Built hierarchy '{}' with {} leaves (weight={})",
        root.name,
        root.leaves().len(),
        root.weight
    );
    Ok(root)
}

fn build_record(raw: &RawRecord, path: &str, category: Option<&str>) -> Result<Node> {
    let category = category.unwrap_or(&raw.name);
    if raw.has_children() {
        build_group(raw, path, Some(category))
    } else {
        build_leaf(raw, path, category.to_string())
    }
}

fn build_group(raw: &RawRecord, path: &str, category: Option<&str>) -> Result<Node> {
    let records = raw.children.as_deref().unwrap_or_default();
    let mut children = records
        .iter()
        .map(|child| build_record(child, &format!("{path}/{}", child.name), category))
        .collect::<Result<Vec<_>>>()?;
    let weight: f64 = children.iter().map(|c| c.weight).sum();
    if !weight.is_finite() {
        return Err(Error::malformed(path, format!("aggregate weight overflows ({weight})")));
    }

    // Vec::sort_by is stable, so equal weights keep input order.
    children.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));

    Ok(Node {
        name: raw.name.clone(),
        category: category.unwrap_or_default().to_string(),
        weight,
        children,
    })
}

fn build_leaf(raw: &RawRecord, path: &str, category: String) -> Result<Node> {
    let Some(value) = raw.value.as_ref() else {
        return Err(Error::malformed(path, "record has neither a value nor children"));
    };
    let Some(weight) = value.as_f64() else {
        return Err(Error::malformed(path, format!("value {value:?} is not a number")));
    };
    if !weight.is_finite() {
        return Err(Error::malformed(path, format!("value {weight} is not finite")));
    }
    if weight < 0.0 {
        return Err(Error::malformed(path, format!("value {weight} is negative")));
    }

    Ok(Node {
        name: raw.name.clone(),
        category,
        // Folds -0.0 into 0.0.
        weight: weight + 0.0,
        children: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawRecord, RawValue};

    fn consoles() -> RawRecord {
        RawRecord::group(
            "Sales",
            vec![
                RawRecord::group(
                    "Wii",
                    vec![RawRecord::leaf("Wii Play", 28.0), RawRecord::leaf("Wii Sports", 82.0)],
                ),
                RawRecord::group(
                    "DS",
                    vec![RawRecord::leaf("Nintendogs", 24.0), RawRecord::leaf("Brain Age", 24.0)],
                ),
                RawRecord::group("PS4", vec![RawRecord::leaf("Spider-Man", 200.0)]),
            ],
        )
    }

    #[test]
    fn internal_weights_are_sums() {
        let root = build(&consoles()).unwrap();
        assert_eq!(root.weight, 82.0 + 28.0 + 24.0 + 24.0 + 200.0);
        for group in &root.children {
            let sum: f64 = group.children.iter().map(|c| c.weight).sum();
            assert_eq!(group.weight, sum);
        }
    }

    #[test]
    fn children_sorted_descending_with_stable_ties() {
        let root = build(&consoles()).unwrap();
        let names: Vec<_> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["PS4", "Wii", "DS"]);
        let wii: Vec<_> = root.children[1].children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(wii, ["Wii Sports", "Wii Play"]);
        let ds: Vec<_> = root.children[2].children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(ds, ["Nintendogs", "Brain Age"]);
    }

    #[test]
    fn leaves_take_top_level_category() {
        let nested = RawRecord::group(
            "root",
            vec![RawRecord::group(
                "Movies",
                vec![RawRecord::group("Action", vec![RawRecord::leaf("Heat", 3.0)])],
            )],
        );
        let root = build(&nested).unwrap();
        let leaves = root.leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].category, "Movies");
    }

    #[test]
    fn internal_value_is_ignored() {
        let mut raw = consoles();
        raw.value = Some(RawValue::Number(1.0));
        if let Some(children) = raw.children.as_mut() {
            children[0].value = Some(RawValue::Number(9999.0));
        }
        let root = build(&raw).unwrap();
        assert_eq!(root.weight, 358.0);
    }

    #[test]
    fn string_values_are_parsed() {
        let raw: RawRecord = serde_json::from_str(
            r#"{"name":"root","children":[{"name":"Wii","children":[
                {"name":"Wii Sports","category":"Wii","value":"82.53"}]}]}"#,
        )
        .unwrap();
        let root = build(&raw).unwrap();
        assert_eq!(root.weight, 82.53);
    }

    #[test]
    fn negative_value_is_malformed() {
        let raw = RawRecord::group("root", vec![RawRecord::leaf("bad", -1.0)]);
        let err = build(&raw).unwrap_err();
        assert!(matches!(err, Error::MalformedDataset { ref path, .. } if path == "root/bad"));
    }

    #[test]
    fn non_finite_value_is_malformed() {
        let raw = RawRecord::group("root", vec![RawRecord::leaf("nan", f64::NAN)]);
        assert!(matches!(build(&raw), Err(Error::MalformedDataset { .. })));
        let raw = RawRecord::group("root", vec![RawRecord::leaf("inf", f64::INFINITY)]);
        assert!(matches!(build(&raw), Err(Error::MalformedDataset { .. })));
    }

    #[test]
    fn record_without_value_or_children_is_malformed() {
        let empty = RawRecord {
            name: "empty".into(),
            category: None,
            value: None,
            children: Some(Vec::new()),
        };
        let raw = RawRecord::group("root", vec![RawRecord::leaf("ok", 1.0), empty]);
        let err = build(&raw).unwrap_err();
        assert!(matches!(err, Error::MalformedDataset { ref path, .. } if path == "root/empty"));
    }

    #[test]
    fn unparsable_string_is_malformed() {
        let mut leaf = RawRecord::leaf("x", 0.0);
        leaf.value = Some(RawValue::Text("lots".into()));
        let raw = RawRecord::group("root", vec![leaf]);
        assert!(matches!(build(&raw), Err(Error::MalformedDataset { .. })));
    }

    #[test]
    fn aggregate_overflow_is_malformed() {
        let raw = RawRecord::group(
            "root",
            vec![
                RawRecord::group("A", vec![RawRecord::leaf("a", 1e308)]),
                RawRecord::group("B", vec![RawRecord::leaf("b", 1e308)]),
            ],
        );
        let err = build(&raw).unwrap_err();
        assert!(matches!(err, Error::MalformedDataset { ref path, .. } if path == "root"));

        // Overflow inside a nested group reports that group.
        let raw = RawRecord::group(
            "root",
            vec![RawRecord::group("A", vec![RawRecord::leaf("a1", f64::MAX), RawRecord::leaf("a2", f64::MAX)])],
        );
        let err = build(&raw).unwrap_err();
        assert!(matches!(err, Error::MalformedDataset { ref path, .. } if path == "root/A"));
    }

    #[test]
    fn single_leaf_root() {
        let root = build(&RawRecord::leaf("only", 5.0)).unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.category, "only");
        assert_eq!(root.leaves().len(), 1);
    }
}
