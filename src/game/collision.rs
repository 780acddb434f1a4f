//! Hit Testing Over Collections
//!
//! Impact resolution and selection both reduce to the oriented-rectangle
//! test on each unit; these helpers run it across the live unit list in
//! collection order.

use crate::core::vec2::{ConversionError, Vector};
use crate::game::entity::Team;
use crate::game::tank::{Selection, Tank};

/// Indices of units whose chassis contains `impact`.
pub fn units_containing(units: &[Tank], impact: Vector) -> Result<Vec<usize>, ConversionError> {
    let mut hits = Vec::new();
    for (index, unit) in units.iter().enumerate() {
        if unit.point_inside(impact)? {
            hits.push(index);
        }
    }
    Ok(hits)
}

/// Indices of `team` units matched by a selection gesture.
pub fn units_selected_by(units: &[Tank], team: Team, selection: &Selection) -> Vec<usize> {
    units
        .iter()
        .enumerate()
        .filter(|(_, unit)| unit.team == team && unit.selected_by(selection))
        .map(|(index, _)| index)
        .collect()
}
