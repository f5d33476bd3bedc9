//! # Visibility
//!
//! Radius-bounded vision with line-of-sight occlusion by walls.
//!
//! Granting vision marks tiles visible and explored; revoking only clears
//! `visible`, so the explored map is permanent fog-of-war memory. Callers
//! that hold a map inside a shared level clone it before calling these.

use crate::game::{Map, Position};
use crate::utils::{for_each_in_circle, has_line_of_sight};

impl Map {
    /// Makes every cell within `radius` of `center` that has line of sight
    /// to `center` visible and explored. Walls block sight but are
    /// themselves seen.
    pub fn grant_vision(&mut self, center: Position, radius: i32) {
        let mut newly_visible = Vec::new();
        for_each_in_circle(center, radius, |cell| {
            let already_visible = match self.get(cell) {
                Some(tile) => tile.is_visible(),
                None => return,
            };
            if !already_visible && has_line_of_sight(cell, center, |p| self.is_wall(p)) {
                newly_visible.push(cell);
            }
        });

        for cell in newly_visible {
            if let Some(tile) = self.get_mut(cell) {
                tile.set_visible(true);
            }
        }
    }

    /// Clears `visible` on every cell within `radius` of `center`.
    pub fn revoke_vision(&mut self, center: Position, radius: i32) {
        for_each_in_circle(center, radius, |cell| {
            if let Some(tile) = self.get_mut(cell) {
                tile.set_visible(false);
            }
        });
    }

    /// Moves a vision circle: revokes it around `from`, then grants it
    /// around `to`.
    pub fn shift_vision(&mut self, from: Position, to: Position, radius: i32) {
        self.revoke_vision(from, radius);
        self.grant_vision(to, radius);
    }
}
