pub mod attendees;
pub mod dates;
pub mod dedup;
pub mod events;
pub mod gateway;
pub mod normalize;
pub mod planner;
pub mod rate_limit;
pub mod scoring;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
