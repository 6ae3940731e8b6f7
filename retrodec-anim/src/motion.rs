//! Motion-compensation offset table.
//!
//! Motion codes index a table of 255 pixel offsets arranged as an outward
//! square spiral around the co-located block: code 0 is the block itself,
//! codes 1.. walk ring after ring. Offsets are stored pre-scaled by the
//! frame pitch so a block procedure can add them to a reference position
//! directly.

/// Number of motion codes; codes above this range have special meanings.
pub const MOTION_CODES: usize = 255;

/// Largest ring radius the table reaches.
pub const MAX_RADIUS: i32 = 8;

/// Build the offset table for a frame of the given pitch.
pub fn motion_table(pitch: i32) -> [i32; MOTION_CODES] {
    let mut table = [0i32; MOTION_CODES];
    let mut n = 1; // entry 0 stays the co-located block
    'rings: for radius in 1..=MAX_RADIUS {
        for (dx, dy) in ring(radius) {
            if n == MOTION_CODES {
                break 'rings;
            }
            table[n] = dy * pitch + dx;
            n += 1;
        }
    }
    table
}

/// The perimeter cells of the square ring at `radius`, walked clockwise
/// from the top-left corner.
fn ring(radius: i32) -> Vec<(i32, i32)> {
    let r = radius;
    let mut cells = Vec::with_capacity(8 * r as usize);
    for x in -r..=r {
        cells.push((x, -r));
    }
    for y in (-r + 1)..=r {
        cells.push((r, y));
    }
    for x in (-r..r).rev() {
        cells.push((x, r));
    }
    for y in ((-r + 1)..r).rev() {
        cells.push((-r, y));
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ring_sizes() {
        for r in 1..=8 {
            assert_eq!(ring(r).len(), 8 * r as usize);
        }
    }

    #[test]
    fn test_code_zero_is_colocated() {
        assert_eq!(motion_table(320)[0], 0);
    }

    #[test]
    fn test_entries_unique() {
        // With a pitch wider than two rings the dy*pitch+dx packing cannot
        // collide.
        let table = motion_table(320);
        let unique: HashSet<i32> = table.iter().copied().collect();
        assert_eq!(unique.len(), MOTION_CODES);
    }

    #[test]
    fn test_spiral_grows_outward() {
        let pitch = 1000;
        let table = motion_table(pitch);
        let mut last_radius = 0i32;
        for &offset in table.iter() {
            let dy = (offset as f64 / pitch as f64).round() as i32;
            let dx = offset - dy * pitch;
            let radius = dx.abs().max(dy.abs());
            assert!(radius >= last_radius, "spiral stepped back inward");
            assert!(radius <= last_radius + 1, "spiral skipped a ring");
            last_radius = radius;
        }
        assert_eq!(last_radius, MAX_RADIUS);
    }

    #[test]
    fn test_scaled_by_pitch() {
        let narrow = motion_table(16);
        let wide = motion_table(64);
        // Entry 1 is (-1, -1): one row up, one column left.
        assert_eq!(narrow[1], -16 - 1);
        assert_eq!(wide[1], -64 - 1);
    }
}
