//! Shopping-list aggregation: the only data transformation in the service.

use std::collections::HashMap;

use crate::domain::types::IngredientLine;

/// One merged entry of the downloadable shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: u64,
}

/// Merge ingredient lines by (name, measurement_unit), summing amounts.
///
/// Grouping is by display name and unit rather than ingredient id: two
/// catalog rows sharing a name and unit must collapse into one list entry.
/// Output order is the insertion order of each pair's first occurrence,
/// which makes the rendered document deterministic. An empty cart yields
/// an empty list, not an error.
pub fn aggregate(lines: &[IngredientLine]) -> Vec<ShoppingListItem> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut items: Vec<ShoppingListItem> = Vec::new();

    for line in lines {
        let key = (line.name.clone(), line.measurement_unit.clone());
        match index.get(&key) {
            Some(&i) => items[i].total_amount += line.amount as u64,
            None => {
                index.insert(key, items.len());
                items.push(ShoppingListItem {
                    name: line.name.clone(),
                    measurement_unit: line.measurement_unit.clone(),
                    total_amount: line.amount as u64,
                });
            }
        }
    }

    items
}
