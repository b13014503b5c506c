//! Raceclass input validation and grouping shared by the raceplan and
//! startlist generators.

use std::collections::BTreeMap;

use crate::error::{Result, StorageError};
use crate::models::Raceclass;

/// Sort raceclasses on `(group, order)` and split them into their groups.
pub fn group_raceclasses(raceclasses: &[Raceclass]) -> Vec<Vec<&Raceclass>> {
    let mut grouped: BTreeMap<u32, Vec<&Raceclass>> = BTreeMap::new();
    for raceclass in raceclasses {
        grouped.entry(raceclass.group).or_default().push(raceclass);
    }
    grouped
        .into_values()
        .map(|mut group| {
            group.sort_by_key(|raceclass| raceclass.order);
            group
        })
        .collect()
}

/// Validate the raceclass set an event hands us before planning on it.
///
/// Group values must be consecutive, order values unique and consecutive
/// within each group, and the ranking flag uniform per group.
pub fn validate_raceclasses(event_id: &str, raceclasses: &[Raceclass]) -> Result<()> {
    if raceclasses.is_empty() {
        return Err(StorageError::IllegalValue(format!(
            "No raceclass for event {event_id}. Cannot proceed."
        )));
    }

    let mut groups: Vec<u32> = raceclasses.iter().map(|r| r.group).collect();
    groups.sort_unstable();
    groups.dedup();
    let consecutive = groups
        .windows(2)
        .all(|pair| pair[1] == pair[0] + 1);
    if !consecutive {
        return Err(StorageError::IllegalValue(format!(
            "Raceclasses group values for event {event_id} are not consecutive."
        )));
    }

    for group in group_raceclasses(raceclasses) {
        let mut orders: Vec<u32> = group.iter().map(|r| r.order).collect();
        orders.sort_unstable();
        let unique = orders.windows(2).all(|pair| pair[0] != pair[1]);
        if !unique {
            return Err(StorageError::IllegalValue(format!(
                "Raceclasses order values for event {event_id} are not unique inside group."
            )));
        }
        let consecutive = orders.windows(2).all(|pair| pair[1] == pair[0] + 1);
        if !consecutive {
            return Err(StorageError::IllegalValue(format!(
                "Raceclasses order values for event {event_id} are not consecutive."
            )));
        }
        if group.iter().any(|r| r.ranking != group[0].ranking) {
            return Err(StorageError::IllegalValue(format!(
                "Ranking-value differs in group {}.",
                group[0].group
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raceclass(name: &str, group: u32, order: u32, ranking: bool) -> Raceclass {
        Raceclass {
            id: None,
            name: name.to_string(),
            ageclasses: vec![name.to_string()],
            no_of_contestants: 10,
            ranking,
            group,
            order,
        }
    }

    #[test]
    fn groups_sort_on_group_then_order() {
        let raceclasses = vec![
            raceclass("G16", 2, 1, true),
            raceclass("J11", 1, 2, true),
            raceclass("G11", 1, 1, true),
        ];
        let groups = group_raceclasses(&raceclasses);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0][0].name, "G11");
        assert_eq!(groups[0][1].name, "J11");
        assert_eq!(groups[1][0].name, "G16");
    }

    #[test]
    fn rejects_gap_in_groups() {
        let raceclasses = vec![raceclass("G11", 1, 1, true), raceclass("G16", 3, 1, true)];
        assert!(validate_raceclasses("e1", &raceclasses).is_err());
    }

    #[test]
    fn rejects_duplicate_order_inside_group() {
        let raceclasses = vec![raceclass("G11", 1, 1, true), raceclass("J11", 1, 1, true)];
        assert!(validate_raceclasses("e1", &raceclasses).is_err());
    }

    #[test]
    fn rejects_mixed_ranking_inside_group() {
        let raceclasses = vec![raceclass("G11", 1, 1, true), raceclass("J11", 1, 2, false)];
        assert!(validate_raceclasses("e1", &raceclasses).is_err());
    }

    #[test]
    fn accepts_wellformed_raceclasses() {
        let raceclasses = vec![
            raceclass("G11", 1, 1, false),
            raceclass("J11", 1, 2, false),
            raceclass("G16", 2, 1, true),
        ];
        assert!(validate_raceclasses("e1", &raceclasses).is_ok());
    }

    #[test]
    fn rejects_empty_raceclasses() {
        assert!(validate_raceclasses("e1", &[]).is_err());
    }
}
