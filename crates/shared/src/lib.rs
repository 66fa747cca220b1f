pub mod calc;
pub mod calibration;
pub mod error;
pub mod models;
pub mod placement;
pub mod point;
pub mod projection;
pub mod round;
