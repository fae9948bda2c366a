pub mod check;
pub mod compile;
pub mod dump;
pub mod error;
pub mod loader;
pub mod parse;
pub mod report;

#[cfg(test)]
mod parse_tests;
#[cfg(test)]
mod test_utils;
