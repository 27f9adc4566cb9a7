use serde::{Deserialize, Serialize};

use super::{CoreError, Result};

/// Canonical dimension order every slice is described against.
pub const CANONICAL_ORDER: &str = "XYZCT";
pub const N_DIM: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
    Channel,
    Time,
}

impl Axis {
    pub const ALL: [Axis; N_DIM] = [Axis::X, Axis::Y, Axis::Z, Axis::Channel, Axis::Time];

    pub fn symbol(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
            Axis::Channel => 'C',
            Axis::Time => 'T',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'X' => Some(Axis::X),
            'Y' => Some(Axis::Y),
            'Z' => Some(Axis::Z),
            'C' => Some(Axis::Channel),
            'T' => Some(Axis::Time),
            _ => None,
        }
    }

    /// Position of this axis in [`CANONICAL_ORDER`].
    pub fn canonical_index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
            Axis::Channel => 3,
            Axis::Time => 4,
        }
    }
}

/// Where each canonical axis sits inside a reader-reported dimension order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisIndexMap {
    positions: [usize; N_DIM],
}

impl Default for AxisIndexMap {
    fn default() -> Self {
        Self {
            positions: [0, 1, 2, 3, 4],
        }
    }
}

impl AxisIndexMap {
    pub fn position(&self, axis: Axis) -> usize {
        self.positions[axis.canonical_index()]
    }

    /// Positions indexed by canonical axis (X, Y, Z, C, T).
    pub fn positions(&self) -> [usize; N_DIM] {
        self.positions
    }

    /// Scatters values given in canonical order into reported order.
    pub fn to_reported<T: Copy>(&self, canonical: [T; N_DIM]) -> [T; N_DIM] {
        let mut reported = canonical;
        for (axis, value) in canonical.into_iter().enumerate() {
            reported[self.positions[axis]] = value;
        }
        reported
    }

    /// Gathers values given in reported order back into canonical order.
    pub fn to_canonical<T: Copy>(&self, reported: [T; N_DIM]) -> [T; N_DIM] {
        let mut canonical = reported;
        for (axis, position) in self.positions.into_iter().enumerate() {
            canonical[axis] = reported[position];
        }
        canonical
    }

    /// Z, C and T canonical slots ordered from fastest to slowest varying.
    fn plane_axes(&self) -> [usize; 3] {
        let mut slots = [0_usize, 1, 2];
        slots.sort_by_key(|slot| self.positions[slot + 2]);
        slots
    }

    /// Decodes a linear plane index into `[z, c, t]` for the given `[size_z, size_c, size_t]`.
    ///
    /// Among Z, C and T the axis appearing first in the reported order varies fastest.
    pub fn plane_coords(&self, sizes: [usize; 3], index: usize) -> Result<[usize; 3]> {
        let count = sizes.iter().product::<usize>();
        if index >= count {
            return Err(CoreError::InvalidCoordinates(format!(
                "plane index {index} out of range for {count} planes"
            )));
        }
        let mut coords = [0_usize; 3];
        let mut remaining = index;
        for slot in self.plane_axes() {
            coords[slot] = remaining % sizes[slot];
            remaining /= sizes[slot];
        }
        Ok(coords)
    }

    /// Inverse of [`AxisIndexMap::plane_coords`].
    pub fn plane_index(&self, sizes: [usize; 3], coords: [usize; 3]) -> Result<usize> {
        if coords.iter().zip(sizes).any(|(coord, size)| *coord >= size) {
            return Err(CoreError::InvalidCoordinates(format!(
                "coordinates {coords:?} out of range for sizes {sizes:?}"
            )));
        }
        let index = self
            .plane_axes()
            .into_iter()
            .rev()
            .fold(0, |index, slot| index * sizes[slot] + coords[slot]);
        Ok(index)
    }
}

/// Validates a reported dimension order and locates each canonical axis in it.
pub fn normalize(reported: &str) -> Result<AxisIndexMap> {
    let invalid = |reason: String| CoreError::InvalidAxisOrder {
        order: reported.to_string(),
        reason,
    };
    let symbols = reported.chars().collect::<Vec<_>>();
    if symbols.len() != N_DIM {
        return Err(invalid(format!(
            "the number of dimensions must be {N_DIM}, found {}",
            symbols.len()
        )));
    }

    let mut positions = [None; N_DIM];
    for (position, symbol) in symbols.into_iter().enumerate() {
        let axis = Axis::from_symbol(symbol).ok_or_else(|| {
            invalid(format!(
                "`{symbol}` is not one of the axes in {CANONICAL_ORDER}"
            ))
        })?;
        let slot = &mut positions[axis.canonical_index()];
        if slot.is_some() {
            return Err(invalid(format!("axis `{symbol}` appears more than once")));
        }
        *slot = Some(position);
    }

    let mut resolved = [0_usize; N_DIM];
    for (axis, position) in positions.into_iter().enumerate() {
        resolved[axis] = position.ok_or_else(|| {
            invalid(format!("dimension order is not a permutation of {CANONICAL_ORDER}"))
        })?;
    }
    Ok(AxisIndexMap {
        positions: resolved,
    })
}
