//! Strike ladder and premium estimation.
//!
//! - **Strike ladder**: ATM strike plus a symmetric set of tradable strikes
//! - **Premium estimator**: Intrinsic value plus time value that decays away from ATM

mod ladder;
mod premium;

pub use ladder::{generate_strike_ladder, StrikeLadder};
pub use premium::{distance_factor, estimate_premium, MIN_PREMIUM};
