//! Command implementations for the lzframe CLI.

pub mod cat;
pub mod info;
pub mod test;

pub use cat::cmd_cat;
pub use info::cmd_info;
pub use test::cmd_test;
