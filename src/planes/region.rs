use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Spatial sub-rectangle of a plane. A missing (or zero) width/height means the full extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaneRect {
    #[serde(default)]
    pub x: usize,
    #[serde(default)]
    pub y: usize,
    #[serde(default)]
    pub width: Option<usize>,
    #[serde(default)]
    pub height: Option<usize>,
}

impl PlaneRect {
    pub fn full() -> Self {
        Self::default()
    }

    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width: Some(width),
            height: Some(height),
        }
    }

    /// Width and height after substituting the plane extent for unset values.
    pub fn resolve(&self, plane_width: usize, plane_height: usize) -> (usize, usize) {
        let width = self.width.filter(|value| *value > 0).unwrap_or(plane_width);
        let height = self.height.filter(|value| *value > 0).unwrap_or(plane_height);
        (width, height)
    }
}

impl FromStr for PlaneRect {
    type Err = String;

    /// Parses `X,Y,W,H`; a non-positive `W` or `H` selects the full extent.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let fields = value
            .split(',')
            .map(|field| field.trim().parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| format!("invalid rectangle `{value}`: {error}"))?;
        let [x, y, width, height] = fields[..] else {
            return Err(format!("rectangle `{value}` must have the form X,Y,W,H"));
        };
        if x < 0 || y < 0 {
            return Err(format!("rectangle origin ({x}, {y}) must be non-negative"));
        }
        let extent = |size: i64| (size > 0).then_some(size as usize);
        Ok(Self {
            x: x as usize,
            y: y as usize,
            width: extent(width),
            height: extent(height),
        })
    }
}

/// Optional subsets of depth and time indices to keep.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaneFilter {
    #[serde(default)]
    pub depths: Option<BTreeSet<usize>>,
    #[serde(default)]
    pub times: Option<BTreeSet<usize>>,
}

impl PlaneFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_depths(mut self, depths: impl IntoIterator<Item = usize>) -> Self {
        self.depths = Some(depths.into_iter().collect());
        self
    }

    pub fn with_times(mut self, times: impl IntoIterator<Item = usize>) -> Self {
        self.times = Some(times.into_iter().collect());
        self
    }

    pub fn accepts(&self, depth: usize, time: usize) -> bool {
        let keeps = |subset: &Option<BTreeSet<usize>>, index: usize| {
            subset.as_ref().is_none_or(|subset| subset.contains(&index))
        };
        keeps(&self.depths, depth) && keeps(&self.times, time)
    }
}
