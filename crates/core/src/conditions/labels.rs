//! Display labels for the merged checklist.
//!
//! Top-level conditions are numbered 1..N in merge order. Nested conditions show their own id.
//! Divider rows are headings and carry no label, so neither they nor nested rows consume a
//! number; adding or removing a nested condition never renumbers the top-level ones.

use super::merge::MergedItem;
use super::template::Placement;
use cmvr_types::ConditionId;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Label {
    Number(usize),
    Nested(ConditionId),
    Divider,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Number(n) => write!(f, "{n}"),
            Label::Nested(id) => write!(f, "{id}"),
            Label::Divider => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelledItem<'a> {
    pub item: &'a MergedItem,
    pub label: Label,
}

pub fn label(items: &[MergedItem]) -> Vec<LabelledItem<'_>> {
    let mut counter = 1;

    items
        .iter()
        .map(|item| {
            let label = match &item.placement {
                Placement::TopLevel => {
                    let n = counter;
                    counter += 1;
                    Label::Number(n)
                }
                Placement::Nested { .. } => Label::Nested(item.id.clone()),
                Placement::Divider => Label::Divider,
            };
            LabelledItem { item, label }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::merge::Origin;
    use crate::conditions::template::Descriptions;

    fn item(id: &str, placement: Placement) -> MergedItem {
        MergedItem {
            id: ConditionId::new(id).unwrap(),
            title: id.to_string(),
            descriptions: Descriptions::default(),
            placement,
            origin: Origin::Template,
        }
    }

    fn nested(id: &str, parent: &str) -> MergedItem {
        item(
            id,
            Placement::Nested {
                parent: ConditionId::new(parent).unwrap(),
            },
        )
    }

    fn rendered(items: &[MergedItem]) -> Vec<(String, String)> {
        label(items)
            .into_iter()
            .map(|l| (l.label.to_string(), l.item.id.to_string()))
            .collect()
    }

    #[test]
    fn test_labels_number_top_level_and_keep_nested_ids() {
        let items = vec![
            item("1", Placement::TopLevel),
            item("2", Placement::TopLevel),
            item("7", Placement::Divider),
            nested("7a", "7"),
            nested("7b", "7"),
            item("8", Placement::TopLevel),
        ];

        let labels: Vec<Label> = label(&items).into_iter().map(|l| l.label).collect();
        assert_eq!(
            labels,
            vec![
                Label::Number(1),
                Label::Number(2),
                Label::Divider,
                Label::Nested(ConditionId::new("7a").unwrap()),
                Label::Nested(ConditionId::new("7b").unwrap()),
                Label::Number(3),
            ]
        );
    }

    #[test]
    fn test_inserting_nested_child_does_not_renumber_top_level() {
        let before = vec![
            item("1", Placement::TopLevel),
            item("7", Placement::Divider),
            nested("7a", "7"),
            item("8", Placement::TopLevel),
        ];
        let mut after = before.clone();
        after.insert(3, nested("7b", "7"));

        let numbers = |items: &[MergedItem]| -> Vec<(String, usize)> {
            label(items)
                .into_iter()
                .filter_map(|l| match l.label {
                    Label::Number(n) => Some((l.item.id.to_string(), n)),
                    _ => None,
                })
                .collect()
        };

        assert_eq!(numbers(&before), numbers(&after));
    }

    #[test]
    fn test_display_forms() {
        let items = vec![item("7", Placement::Divider), nested("7a", "7")];
        assert_eq!(
            rendered(&items),
            vec![
                (String::new(), "7".to_string()),
                ("7a".to_string(), "7a".to_string())
            ]
        );
    }

    #[test]
    fn test_empty_list_has_no_labels() {
        assert!(label(&[]).is_empty());
    }
}
