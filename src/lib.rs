pub mod analyzers;
pub mod clean;
pub mod error;
pub mod flight;
pub mod loader;
pub mod normalize;
pub mod output;

#[cfg(test)]
pub(crate) mod test_support;
