//! Export core modules shared by front ends.

#[cfg(feature = "excel")]
pub mod excel_core;
