//! Integration tests for the honeytree hierarchy manager

mod cli_contracts;
mod concurrent_mutations;
mod hierarchy_properties;
mod sled_scenarios;
