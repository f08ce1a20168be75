//! LOD level table: configuration, validation, distance-based selection
//!
//! An ordered sequence of detail tiers, each covering viewer distances up
//! to its threshold. The last tier's threshold doubles as the global max
//! view distance. The table is validated once at configuration time and
//! immutable afterwards, so selection is a plain ascending scan.

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;

/// One detail tier of the LOD table
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LodLevel {
    /// Vertex stride used when triangulating this tier's mesh
    pub skip_factor: u32,
    /// Chunks whose nearest edge is within this distance may use this tier
    pub visible_distance_threshold: f32,
    /// Whether this tier's mesh doubles as the collision mesh
    pub use_for_collision: bool,
}

/// Three-tier default table tuned for 240-quad chunks
pub fn default_levels() -> Vec<LodLevel> {
    vec![
        LodLevel {
            skip_factor: 1,
            visible_distance_threshold: 300.0,
            use_for_collision: true,
        },
        LodLevel {
            skip_factor: 4,
            visible_distance_threshold: 600.0,
            use_for_collision: false,
        },
        LodLevel {
            skip_factor: 8,
            visible_distance_threshold: 1200.0,
            use_for_collision: false,
        },
    ]
}

/// Validate an LOD table: non-empty, strictly ascending thresholds, strides
/// that are >= 1 and divide the chunk quad count, at least one tier flagged
/// for collision.
///
/// Returns the collision slot index; when several tiers are flagged the
/// last one wins.
pub fn validate_levels(levels: &[LodLevel], quads_per_chunk: u32) -> Result<usize> {
    if levels.is_empty() {
        return Err(Error::LodConfig("LOD table is empty".into()));
    }

    let mut previous = f32::NEG_INFINITY;
    let mut collision_index = None;
    for (i, level) in levels.iter().enumerate() {
        if !level.visible_distance_threshold.is_finite()
            || level.visible_distance_threshold <= previous
        {
            return Err(Error::LodConfig(format!(
                "tier {} threshold {} must be finite and increase over the previous tier",
                i, level.visible_distance_threshold
            )));
        }
        previous = level.visible_distance_threshold;

        if level.skip_factor == 0 || quads_per_chunk % level.skip_factor != 0 {
            return Err(Error::LodConfig(format!(
                "tier {} skip factor {} must be >= 1 and divide {}",
                i, level.skip_factor, quads_per_chunk
            )));
        }

        if level.use_for_collision {
            collision_index = Some(i);
        }
    }

    collision_index.ok_or_else(|| Error::LodConfig("no tier is flagged for collision".into()))
}

/// Smallest tier whose threshold covers `distance`; the coarsest tier when
/// none does. Ascending thresholds make the scan well-defined.
pub fn select_lod_index(levels: &[LodLevel], distance: f32) -> usize {
    for (i, level) in levels.iter().enumerate() {
        if distance <= level.visible_distance_threshold {
            return i;
        }
    }
    levels.len() - 1
}

/// The last tier's threshold bounds overall chunk visibility
pub fn max_view_distance(levels: &[LodLevel]) -> f32 {
    levels.last().map(|l| l.visible_distance_threshold).unwrap_or(0.0)
}
