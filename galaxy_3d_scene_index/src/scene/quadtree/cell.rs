/// Cell addressing for the quadtree.
///
/// A cell is the square owned by one node: `offset` is its min corner and
/// `altitude` is log2 of half its side, so side = 2^(altitude + 1). The unit
/// cell (altitude -1, side 1) holds exactly one integer point and is the
/// smallest cell that exists.
///
/// Quadrant layout: bit0 = X, bit1 = Y, 0 = low half, 1 = high half.

use bitflags::bitflags;
use glam::{I64Vec2, IVec2};

/// Altitude of the unit cell
pub const MIN_ALTITUDE: i32 = -1;

bitflags! {
    /// Sides of a cell a point lies beyond.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CellSides: u8 {
        const LEFT = 1;
        const BOTTOM = 2;
        const RIGHT = 4;
        const TOP = 8;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub offset: I64Vec2,
    pub altitude: i32,
}

impl Cell {
    pub fn new(offset: I64Vec2, altitude: i32) -> Self {
        debug_assert!(altitude >= MIN_ALTITUDE, "cell altitude below the unit cell: {}", altitude);
        Self { offset, altitude }
    }

    /// Cell of the given altitude whose min corner is `position`
    pub fn at(position: IVec2, altitude: i32) -> Self {
        Self::new(position.as_i64vec2(), altitude)
    }

    /// Side length: 2^(altitude + 1)
    #[inline]
    pub fn size(&self) -> i64 {
        1i64 << (self.altitude + 1)
    }

    /// Exclusive max corner
    #[inline]
    pub fn end(&self) -> I64Vec2 {
        self.offset + I64Vec2::splat(self.size())
    }

    /// Whether this cell can be subdivided
    #[inline]
    pub fn can_split(&self) -> bool {
        self.altitude > MIN_ALTITUDE
    }

    /// Sides of this cell that `position` lies beyond (empty when contained)
    pub fn outside_sides(&self, position: IVec2) -> CellSides {
        let p = position.as_i64vec2();
        let end = self.end();

        let mut sides = CellSides::empty();
        sides.set(CellSides::LEFT, p.x < self.offset.x);
        sides.set(CellSides::RIGHT, p.x >= end.x);
        sides.set(CellSides::BOTTOM, p.y < self.offset.y);
        sides.set(CellSides::TOP, p.y >= end.y);
        sides
    }

    /// `offset <= position < offset + size` on both axes
    #[inline]
    pub fn contains(&self, position: IVec2) -> bool {
        self.outside_sides(position).is_empty()
    }

    /// Quadrant (0..4) of the child cell containing `position`.
    ///
    /// Only meaningful for a cell that can split and contains `position`.
    #[inline]
    pub fn quadrant_of(&self, position: IVec2) -> u8 {
        debug_assert!(self.can_split(), "unit cells have no quadrants");
        let mid = self.offset + I64Vec2::splat(1i64 << self.altitude);
        let p = position.as_i64vec2();
        (p.x >= mid.x) as u8 | (((p.y >= mid.y) as u8) << 1)
    }

    /// Child cell for quadrant `quadrant`
    pub fn child(&self, quadrant: u8) -> Cell {
        debug_assert!(self.can_split(), "unit cells have no children");
        debug_assert!(quadrant < 4);
        let half = 1i64 << self.altitude;
        let shift = I64Vec2::new((quadrant & 1) as i64, ((quadrant >> 1) & 1) as i64) * half;
        Cell {
            offset: self.offset + shift,
            altitude: self.altitude - 1,
        }
    }

    /// Smallest cell anchored at the min corner of this cell and `position`
    /// that covers both, never smaller than this one.
    ///
    /// Only valid for a root that has never been subdivided: every child
    /// cell derived from the old one would be invalidated.
    pub fn covering(&self, position: IVec2) -> Cell {
        let p = position.as_i64vec2();
        let min = self.offset.min(p);
        let max = (self.end() - I64Vec2::ONE).max(p);
        let extent = (max - min + I64Vec2::ONE).max_element();

        let mut altitude = self.altitude;
        while (1i64 << (altitude + 1)) < extent {
            altitude += 1;
        }
        Cell { offset: min, altitude }
    }

    /// Parent cell of twice the size, grown toward `position`.
    ///
    /// Per axis the parent extends toward the side `position` lies beyond;
    /// when `position` is already within this cell on that axis, it extends
    /// toward the half of this cell `position` falls in, so repeated growth
    /// stays centered on the target. Returns the parent and the quadrant
    /// this cell occupies in it.
    pub fn wrap_toward(&self, position: IVec2) -> (Cell, u8) {
        let sides = self.outside_sides(position);
        let p = position.as_i64vec2();
        let size = self.size();
        // Doubled to compare against the center without halving an odd value
        let center2 = self.offset * 2 + I64Vec2::splat(size);

        let grow_left = if sides.contains(CellSides::LEFT) {
            true
        } else if sides.contains(CellSides::RIGHT) {
            false
        } else {
            p.x * 2 < center2.x
        };
        let grow_down = if sides.contains(CellSides::BOTTOM) {
            true
        } else if sides.contains(CellSides::TOP) {
            false
        } else {
            p.y * 2 < center2.y
        };

        let mut offset = self.offset;
        let mut quadrant = 0u8;
        if grow_left {
            offset.x -= size;
            quadrant |= 1;
        }
        if grow_down {
            offset.y -= size;
            quadrant |= 2;
        }

        (Cell { offset, altitude: self.altitude + 1 }, quadrant)
    }
}

#[cfg(test)]
#[path = "cell_tests.rs"]
mod tests;
