//! CLI Commands

pub mod load;
pub mod run;
