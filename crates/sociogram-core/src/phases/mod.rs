pub mod balance;
pub mod communities;
pub mod homophily;
pub mod metrics;
pub mod resilience;
pub mod temporal;
