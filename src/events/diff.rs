//! Three way partition of two ordered lists of participant emails.
//!
//! Duplicates within a list are collapsed to their first occurrence
//! before comparing; later copies are ignored and never show up in
//! any of the three sets.

use std::collections::HashSet;

/// A value and the position it was found at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indexed {
    pub value: String,
    pub index: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiffResult {
    /// Values only in the new list, indexed into the new list
    pub added: Vec<Indexed>,
    /// Values only in the old list, indexed into the old list
    pub removed: Vec<Indexed>,
    /// Values in both, indexed into the old list so prior state can be
    /// recovered
    pub kept: Vec<Indexed>,
}

pub fn diff<A, B>(old: &[A], new: &[B]) -> DiffResult
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let old_set: HashSet<&str> = old.iter().map(AsRef::as_ref).collect();
    let new_set: HashSet<&str> = new.iter().map(AsRef::as_ref).collect();
    let mut result = DiffResult::default();

    let mut seen = HashSet::new();
    for (index, value) in old.iter().map(AsRef::as_ref).enumerate() {
        if !seen.insert(value) {
            continue;
        }
        let entry = Indexed {
            value: value.to_string(),
            index,
        };
        if new_set.contains(value) {
            result.kept.push(entry);
        } else {
            result.removed.push(entry);
        }
    }

    let mut seen = HashSet::new();
    for (index, value) in new.iter().map(AsRef::as_ref).enumerate() {
        if !seen.insert(value) || old_set.contains(value) {
            continue;
        }
        result.added.push(Indexed {
            value: value.to_string(),
            index,
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(entries: &[Indexed]) -> Vec<&str> {
        entries.iter().map(|e| e.value.as_str()).collect()
    }

    #[test]
    fn it_partitions_added_removed_and_kept() {
        let old = ["a", "b", "c"];
        let new = ["c", "d", "a"];
        let result = diff(&old, &new);

        assert_eq!(
            result.added,
            vec![Indexed {
                value: String::from("d"),
                index: 1
            }]
        );
        assert_eq!(
            result.removed,
            vec![Indexed {
                value: String::from("b"),
                index: 1
            }]
        );
        // Kept entries point back into the old list
        assert_eq!(
            result.kept,
            vec![
                Indexed {
                    value: String::from("a"),
                    index: 0
                },
                Indexed {
                    value: String::from("c"),
                    index: 2
                },
            ]
        );
    }

    #[test]
    fn it_keeps_everything_when_lists_match() {
        let list = ["a", "b", "c"];
        let result = diff(&list, &list);
        assert!(result.added.is_empty());
        assert!(result.removed.is_empty());
        assert_eq!(values(&result.kept), vec!["a", "b", "c"]);
    }

    #[test]
    fn it_covers_both_lists_exactly() {
        let old = ["x@a.com", "y@a.com", "z@a.com"];
        let new = ["y@a.com", "w@a.com"];
        let result = diff(&old, &new);

        let mut from_new: Vec<&str> = values(&result.added);
        from_new.extend(values(&result.kept));
        from_new.sort();
        let mut expected_new = new.to_vec();
        expected_new.sort();
        assert_eq!(from_new, expected_new);

        let mut from_old: Vec<&str> = values(&result.removed);
        from_old.extend(values(&result.kept));
        from_old.sort();
        let mut expected_old = old.to_vec();
        expected_old.sort();
        assert_eq!(from_old, expected_old);
    }

    #[test]
    fn it_handles_empty_lists() {
        let empty: [&str; 0] = [];
        let result = diff(&empty, &["a"]);
        assert_eq!(values(&result.added), vec!["a"]);
        assert!(result.kept.is_empty());

        let result = diff(&["a"], &empty);
        assert_eq!(values(&result.removed), vec!["a"]);
        assert!(result.added.is_empty());
    }

    #[test]
    fn it_ignores_later_duplicates() {
        let old = ["a", "a", "b"];
        let new = vec![
            String::from("b"),
            String::from("c"),
            String::from("c"),
            String::from("b"),
        ];
        let result = diff(&old, &new);

        assert_eq!(
            result.removed,
            vec![Indexed {
                value: String::from("a"),
                index: 0
            }]
        );
        assert_eq!(
            result.kept,
            vec![Indexed {
                value: String::from("b"),
                index: 2
            }]
        );
        assert_eq!(
            result.added,
            vec![Indexed {
                value: String::from("c"),
                index: 1
            }]
        );
    }

    #[test]
    fn it_compares_case_sensitively() {
        let result = diff(&["A@example.com"], &["a@example.com"]);
        assert_eq!(values(&result.added), vec!["a@example.com"]);
        assert_eq!(values(&result.removed), vec!["A@example.com"]);
    }
}
