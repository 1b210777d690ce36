//! Curve modules

mod calc;
mod exponential;

pub use calc::*;
pub use exponential::*;

use crate::{error::CurveError, math::*};
