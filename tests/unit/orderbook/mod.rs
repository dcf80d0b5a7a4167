// Order book unit tests

pub mod cooldown_tests;
pub mod partition_tests;
pub mod scanner_tests;
