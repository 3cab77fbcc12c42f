//! Depth sorting for draw order
//!
//! Transparent geometry must be drawn back to front relative to the
//! viewer. These helpers sort object lists by distance to a point and
//! use insertion sort on purpose: draw lists barely change between
//! frames, and insertion sort is near linear on almost-sorted input.

use std::sync::Arc;

use glam::Vec3;

use crate::resource::Object;

/// Insertion sort, ordered by `less`
///
/// Stable and O(n) when `items` is already mostly sorted, which is the
/// common case for per-frame draw lists.
pub fn insertion_sort<T, F>(items: &mut [T], less: F)
where
    F: Fn(&T, &T) -> bool,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && less(&items[j], &items[j - 1]) {
            items.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Sort objects back to front relative to `target`
///
/// Farthest first. This is the order transparent objects must be drawn
/// in, with `target` typically the camera position.
///
/// # Example
///
/// ```
/// use quasar_gfx::resource::Object;
/// use quasar_gfx::util::sort_by_distance;
/// use quasar_gfx::glam::Vec3;
/// use std::sync::Arc;
///
/// let mut objects: Vec<Arc<Object>> = Vec::new();
/// sort_by_distance(&mut objects, Vec3::ZERO);
/// ```
pub fn sort_by_distance(objects: &mut [Arc<Object>], target: Vec3) {
    insertion_sort(objects, |a, b| {
        a.world_position().distance_squared(target) > b.world_position().distance_squared(target)
    });
}

/// Sort objects front to back relative to `target`
///
/// Nearest first, the preferred order for opaque geometry so early
/// depth testing rejects hidden fragments.
pub fn sort_front_to_back(objects: &mut [Arc<Object>], target: Vec3) {
    insertion_sort(objects, |a, b| {
        a.world_position().distance_squared(target) < b.world_position().distance_squared(target)
    });
}

#[cfg(test)]
#[path = "sort_tests.rs"]
mod tests;
