//! Hierarchical presentation of wear coefficients.
//!
//! ```text
//! category
//!   subcategory ("General" when absent)
//!     bon / moyen / mauvais   (fixed order, empty buckets omitted)
//!       rows by ascending age_min
//! ```
//!
//! Categories and subcategories appear in order of first occurrence in the
//! input. Every input row lands in exactly one bucket.

use serde::Serialize;

use crate::wear::{BucketKey, MaintenanceState, WearCoefficient};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateBucket {
    pub state: MaintenanceState,
    pub rows: Vec<WearCoefficient>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubcategoryGroup {
    pub subcategory: String,
    pub states: Vec<StateBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub subcategories: Vec<SubcategoryGroup>,
}

/// Grouped view over a (usually filtered) list of wear coefficients.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WearGroups {
    pub categories: Vec<CategoryGroup>,
}

impl WearGroups {
    /// Number of rows across all buckets.
    pub fn row_count(&self) -> usize {
        self.buckets().map(|(_, _, b)| b.rows.len()).sum()
    }

    /// Iterate `(category, subcategory, bucket)` in display order.
    pub fn buckets(&self) -> impl Iterator<Item = (&str, &str, &StateBucket)> {
        self.categories.iter().flat_map(|c| {
            c.subcategories.iter().flat_map(move |s| {
                s.states
                    .iter()
                    .map(move |b| (c.category.as_str(), s.subcategory.as_str(), b))
            })
        })
    }

    pub fn bucket(&self, key: &BucketKey) -> Option<&StateBucket> {
        self.buckets()
            .find(|(c, s, b)| *c == key.category && *s == key.subcategory && b.state == key.state)
            .map(|(_, _, b)| b)
    }
}

/// Group `rows` by category, subcategory and maintenance state.
///
/// A state bucket with no rows is omitted, except the one named by
/// `adding_into`: while a row is being added there it is kept (empty) so the
/// add form has a place to render. The exception only applies inside a
/// subcategory that already has rows.
pub fn group_wear_coefficients(
    rows: &[WearCoefficient],
    adding_into: Option<&BucketKey>,
) -> WearGroups {
    // category -> subcategory -> rows, in first-seen order.
    let mut tree: Vec<(String, Vec<(String, Vec<&WearCoefficient>)>)> = Vec::new();

    for row in rows {
        let category = &row.equipment_category;
        let subcategory = row.subcategory_label();

        let cat_idx = match tree.iter().position(|(c, _)| c == category) {
            Some(idx) => idx,
            None => {
                tree.push((category.clone(), Vec::new()));
                tree.len() - 1
            }
        };
        let subs = &mut tree[cat_idx].1;
        match subs.iter_mut().find(|(s, _)| s == subcategory) {
            Some((_, members)) => members.push(row),
            None => subs.push((subcategory.to_string(), vec![row])),
        }
    }

    let categories = tree
        .into_iter()
        .map(|(category, subs)| {
            let subcategories = subs
                .into_iter()
                .map(|(subcategory, members)| {
                    let states = MaintenanceState::ORDER
                        .into_iter()
                        .filter_map(|state| {
                            let mut bucket: Vec<WearCoefficient> = members
                                .iter()
                                .filter(|r| r.maintenance_state == state)
                                .map(|r| (*r).clone())
                                .collect();
                            // Stable: equal age_min keep source order.
                            bucket.sort_by_key(|r| r.age_min);

                            let hosts_add = adding_into.is_some_and(|key| {
                                key.category == category
                                    && key.subcategory == subcategory
                                    && key.state == state
                            });
                            (!bucket.is_empty() || hosts_add).then_some(StateBucket {
                                state,
                                rows: bucket,
                            })
                        })
                        .collect();
                    SubcategoryGroup {
                        subcategory,
                        states,
                    }
                })
                .collect();
            CategoryGroup {
                category,
                subcategories,
            }
        })
        .collect();

    WearGroups { categories }
}
