// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::Activity;

/// Lower-cases and trims a raw query. An empty result means "match all".
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

pub fn matches_query(activity: &Activity, normalized_query: &str) -> bool {
    normalized_query.is_empty() || activity.title.to_lowercase().contains(normalized_query)
}

pub fn filter_activities<'a>(activities: &'a [Activity], query: &str) -> Vec<&'a Activity> {
    let normalized = normalize_query(query);
    activities
        .iter()
        .filter(|activity| matches_query(activity, &normalized))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{filter_activities, normalize_query};
    use crate::model::Activity;

    fn catalog() -> Vec<Activity> {
        vec![
            Activity::new(1, "Hiking"),
            Activity::new(2, "Museum Tour"),
            Activity::new(3, "Beach Day"),
            Activity::new(4, "Night Hike"),
            Activity::new(5, "Street Food Tour"),
        ]
    }

    fn ids(view: &[&Activity]) -> Vec<i64> {
        view.iter().map(|activity| activity.id.get()).collect()
    }

    #[test]
    fn empty_query_returns_catalog_in_order() {
        let catalog = catalog();
        assert_eq!(ids(&filter_activities(&catalog, "")), vec![1, 2, 3, 4, 5]);
        assert_eq!(ids(&filter_activities(&catalog, "   \t")), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn match_is_case_insensitive_substring() {
        let catalog = catalog();
        assert_eq!(ids(&filter_activities(&catalog, "muse")), vec![2]);
        assert_eq!(ids(&filter_activities(&catalog, "TOUR")), vec![2, 5]);
        assert_eq!(ids(&filter_activities(&catalog, "hik")), vec![1, 4]);
        assert_eq!(ids(&filter_activities(&catalog, "ach d")), vec![3]);
    }

    #[test]
    fn surrounding_whitespace_is_ignored_but_inner_is_not() {
        let catalog = catalog();
        assert_eq!(ids(&filter_activities(&catalog, "  beach  ")), vec![3]);
        assert!(filter_activities(&catalog, "beachday").is_empty());
    }

    #[test]
    fn query_is_not_tokenized_or_fuzzy() {
        let catalog = catalog();
        assert!(filter_activities(&catalog, "tour museum").is_empty());
        assert!(filter_activities(&catalog, "mseum").is_empty());
    }

    #[test]
    fn every_result_is_an_ordered_subsequence_that_matches() {
        let catalog = catalog();
        for query in ["", "a", "t", "our", "e ", " x", "Night"] {
            let view = filter_activities(&catalog, query);
            let normalized = normalize_query(query);

            let mut cursor = 0;
            for activity in &view {
                assert!(activity.title.to_lowercase().contains(&normalized));
                let position = catalog[cursor..]
                    .iter()
                    .position(|candidate| candidate.id == activity.id)
                    .map(|offset| cursor + offset)
                    .expect("result must come from the catalog in order");
                cursor = position + 1;
            }
        }
    }

    #[test]
    fn empty_catalog_filters_to_empty() {
        assert!(filter_activities(&[], "hike").is_empty());
        assert!(filter_activities(&[], "").is_empty());
    }
}
