pub mod initialize;
pub mod contribute;
pub mod check_contributions;
pub mod refund;
pub mod close_campaign;

pub use initialize::*;
pub use contribute::*;
pub use check_contributions::*;
pub use refund::*;
pub use close_campaign::*;
