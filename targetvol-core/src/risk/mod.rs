//! Risk math: rolling return windows, the diagonal volatility estimator, and
//! the exposure caps applied to every target weight vector.

pub mod caps;
pub mod returns;
pub mod vol;

pub use caps::{apply_gross_cap, apply_net_cap, apply_per_name_cap, gross_exposure, net_exposure};
pub use returns::ReturnTracker;
pub use vol::{estimate_portfolio_vol, sample_variance};
