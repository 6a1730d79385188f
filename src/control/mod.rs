//! Light / vent control loop.
//!
//! [`sampler`] turns periodic LDR readings into a windowed mean intensity;
//! [`vent`] maps that intensity and the storage temperature to a servo
//! angle.

pub mod sampler;
pub mod vent;
