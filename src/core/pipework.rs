use std::f64::consts::PI;

/// Geometry of the pipe embedded in the panel.
///
/// The fluid loop takes a copy of this when it is built, so any later change to a panel's
/// geometry does not reach a fluid loop that already exists.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipeGeometry {
    length: f64,   // in m
    diameter: f64, // internal diameter, in m
}

impl PipeGeometry {
    /// Arguments:
    /// * `length` - length of pipe running through the panel, in m
    /// * `diameter` - internal diameter of the pipe, in m
    pub fn new(length: f64, diameter: f64) -> Self {
        Self { length, diameter }
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    /// Internal cross-sectional area of the pipe, in m2
    pub fn cross_sectional_area(&self) -> f64 {
        PI * (self.diameter / 2.) * (self.diameter / 2.)
    }
}
