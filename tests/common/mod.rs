//! Shared test infrastructure for mibwalk.
//!
//! Provides TestAgent (in-process SNMPv1 agent), fixtures, and utilities.

// Not every test file uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod agent;
pub mod fixtures;

pub use agent::{AgentMode, TestAgent};
pub use fixtures::{interface_table, mib_tree, system_mib, system_subtree};
