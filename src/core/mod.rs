pub mod common;
pub mod fluid_loop;
pub mod material_properties;
pub mod pipework;
pub mod solar_panel;
pub mod solar_radiation;
pub mod units;
