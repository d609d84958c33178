use std::sync::LazyLock;

/// This module contains data on the properties of materials used by the panel and the fluid loop.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialProperties {
    density: f64,                // kg/m3
    specific_heat_capacity: f64, // J/(kg.K)
}

impl MaterialProperties {
    pub fn new(density: f64, specific_heat_capacity: f64) -> Self {
        Self {
            density,
            specific_heat_capacity,
        }
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn specific_heat_capacity(&self) -> f64 {
        self.specific_heat_capacity
    }

    /// Return mass of a given volume of material, in kg
    ///
    /// Arguments:
    /// * `volume` - volume of material, in m3
    pub fn mass(&self, volume: f64) -> f64 {
        volume * self.density
    }

    /// Return heat capacity of a given mass of material, in J/K
    ///
    /// Arguments:
    /// * `mass` - mass of material, in kg
    pub fn heat_capacity(&self, mass: f64) -> f64 {
        mass * self.specific_heat_capacity
    }
}

/// Density of the metal block forming the panel, in kg/m3
pub const PANEL_METAL_DENSITY: f64 = 7800.;

pub static PANEL_METAL: LazyLock<MaterialProperties> =
    LazyLock::new(|| MaterialProperties::new(PANEL_METAL_DENSITY, 500.0));
pub static WATER: LazyLock<MaterialProperties> =
    LazyLock::new(|| MaterialProperties::new(1000.0, 4180.0));
