//! Category grouping for the composite home listing.
//!
//! Listed entries are partitioned by category, in the order each category is
//! first seen in the canonical sequence. Both the number of groups and the
//! members per group are capped. Entries without a category are not grouped.
//!
//! The composite listing alternates two layouts and places a single
//! promotional slot right after the first group:
//!
//! ```text
//! Group 0  (A)
//! Promotional
//! Group 1  (B)
//! Group 2  (A)
//! Group 3  (B)
//! ```
//!
//! The variant depends only on the group index, never on its content.

use crate::types::{Category, ContentEntry, LayoutVariant, Section};

/// Caps applied while grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupLimits {
    pub groups: usize,
    pub members: usize,
}

impl Default for GroupLimits {
    fn default() -> Self {
        Self {
            groups: 10,
            members: 10,
        }
    }
}

/// Entries of one category, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: &'a Category,
    pub entries: Vec<&'a ContentEntry>,
}

impl LayoutVariant {
    /// A for even (0-based) group indices, B for odd.
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            LayoutVariant::A
        } else {
            LayoutVariant::B
        }
    }
}

/// Partition ordered entries by category id.
pub fn group_by_category<'a>(
    ordered: &[&'a ContentEntry],
    limits: GroupLimits,
) -> Vec<CategoryGroup<'a>> {
    let mut groups: Vec<CategoryGroup<'a>> = Vec::new();
    for &entry in ordered {
        let Some(category) = entry.category.as_ref() else {
            continue;
        };
        if let Some(group) = groups.iter_mut().find(|g| g.category.id == category.id) {
            if group.entries.len() < limits.members {
                group.entries.push(entry);
            }
        } else if groups.len() < limits.groups && limits.members > 0 {
            groups.push(CategoryGroup {
                category,
                entries: vec![entry],
            });
        }
    }
    groups
}

/// Lay out groups as composite listing sections.
pub fn compose(groups: &[CategoryGroup<'_>]) -> Vec<Section> {
    let mut sections = Vec::with_capacity(groups.len() + 1);
    for (index, group) in groups.iter().enumerate() {
        sections.push(Section::Group {
            category_id: group.category.id.clone(),
            category_name: group.category.name.clone(),
            category_slug: group.category.slug.clone(),
            variant: LayoutVariant::for_index(index),
            entry_ids: group.entries.iter().map(|e| e.id.clone()).collect(),
        });
        if index == 0 {
            sections.push(Section::Promotional);
        }
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::sequence;
    use crate::test_helpers::*;

    fn variants(sections: &[Section]) -> Vec<Option<LayoutVariant>> {
        sections
            .iter()
            .map(|s| match s {
                Section::Group { variant, .. } => Some(*variant),
                Section::Promotional => None,
            })
            .collect()
    }

    #[test]
    fn groups_follow_first_encounter_order() {
        let entries = vec![
            entry("a", "2024-05-05").category("food").build(),
            entry("b", "2024-05-04").category("travel").build(),
            entry("c", "2024-05-03").category("food").build(),
            entry("d", "2024-05-02").category("art").build(),
        ];
        let ordered = sequence(&entries);
        let groups = group_by_category(&ordered, GroupLimits::default());

        let slugs: Vec<&str> = groups.iter().map(|g| g.category.slug.as_str()).collect();
        assert_eq!(slugs, vec!["food", "travel", "art"]);
        let food: Vec<&str> = groups[0].entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(food, vec!["a", "c"]);
    }

    #[test]
    fn uncategorized_entries_are_skipped() {
        let entries = vec![
            entry("a", "2024-05-05").build(),
            entry("b", "2024-05-04").category("travel").build(),
        ];
        let ordered = sequence(&entries);
        let groups = group_by_category(&ordered, GroupLimits::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].entries.len(), 1);
    }

    #[test]
    fn group_and_member_limits_are_applied() {
        let mut entries = Vec::new();
        for cat in 0..4 {
            for n in 0..5 {
                entries.push(
                    entry(&format!("c{cat}-{n}"), &format!("2024-05-{:02}", 20 - cat * 5 - n))
                        .category(&format!("cat{cat}"))
                        .build(),
                );
            }
        }
        let ordered = sequence(&entries);
        let groups = group_by_category(
            &ordered,
            GroupLimits {
                groups: 3,
                members: 2,
            },
        );
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.entries.len() == 2));
    }

    #[test]
    fn capped_category_does_not_admit_later_categories() {
        let entries = vec![
            entry("a", "2024-05-05").category("food").build(),
            entry("b", "2024-05-04").category("travel").build(),
            entry("c", "2024-05-03").category("food").build(),
            entry("d", "2024-05-02").category("art").build(),
        ];
        let ordered = sequence(&entries);
        let groups = group_by_category(
            &ordered,
            GroupLimits {
                groups: 1,
                members: 10,
            },
        );
        assert_eq!(groups.len(), 1);
        let ids: Vec<&str> = groups[0].entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn zero_member_limit_yields_no_groups() {
        let entries = vec![entry("a", "2024-05-05").category("food").build()];
        let ordered = sequence(&entries);
        let limits = GroupLimits {
            groups: 10,
            members: 0,
        };
        assert!(group_by_category(&ordered, limits).is_empty());
    }

    #[test]
    fn variant_alternates_by_index() {
        assert_eq!(LayoutVariant::for_index(0), LayoutVariant::A);
        assert_eq!(LayoutVariant::for_index(1), LayoutVariant::B);
        assert_eq!(LayoutVariant::for_index(2), LayoutVariant::A);
        assert_eq!(LayoutVariant::for_index(3), LayoutVariant::B);
    }

    #[test]
    fn four_groups_alternate_with_single_promotional_after_first() {
        let mut entries = Vec::new();
        for (cat, day) in [("food", 28), ("travel", 24), ("art", 20), ("tech", 16)] {
            for n in 0..3 {
                entries.push(
                    entry(&format!("{cat}-{n}"), &format!("2024-05-{:02}", day - n))
                        .category(cat)
                        .build(),
                );
            }
        }
        let ordered = sequence(&entries);
        let sections = compose(&group_by_category(&ordered, GroupLimits::default()));

        use LayoutVariant::{A, B};
        assert_eq!(
            variants(&sections),
            vec![Some(A), None, Some(B), Some(A), Some(B)]
        );
        let promos = sections
            .iter()
            .filter(|s| matches!(s, Section::Promotional))
            .count();
        assert_eq!(promos, 1);
    }

    #[test]
    fn no_groups_means_no_promotional() {
        assert!(compose(&[]).is_empty());
    }
}
