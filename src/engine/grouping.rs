use crate::models::{AggregatedResultSet, MealCombination};

/// Combinations that share a restaurant name, in result-set order.
#[derive(Debug)]
pub struct RestaurantGroup<'a> {
    pub restaurant_name: &'a str,
    /// `(index in the result set, combination)` pairs.
    pub entries: Vec<(usize, &'a MealCombination)>,
}

/// Partition a result set by restaurant name for display.
///
/// Groups appear in order of first appearance and each entry keeps its position
/// in the full result set, which is the key used for saving.
pub fn group_by_restaurant(results: &AggregatedResultSet) -> Vec<RestaurantGroup<'_>> {
    let mut groups: Vec<RestaurantGroup<'_>> = Vec::new();

    for (index, combo) in results.iter().enumerate() {
        match groups
            .iter_mut()
            .find(|g| g.restaurant_name == combo.restaurant_name)
        {
            Some(group) => group.entries.push((index, combo)),
            None => groups.push(RestaurantGroup {
                restaurant_name: &combo.restaurant_name,
                entries: vec![(index, combo)],
            }),
        }
    }

    groups
}
