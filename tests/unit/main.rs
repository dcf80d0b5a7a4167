// Unit tests for public monitor components
//
// Organized by component:
// - orderbook: cooldown, partitioning and scanner properties
// - config: environment loading
// - notify: alert rendering

mod config_tests;
mod notify_tests;
mod orderbook;
