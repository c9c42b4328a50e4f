pub mod calculators;
pub mod core;
pub mod utils;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
