pub mod app;
pub mod cancel;
pub mod classify;
pub mod cli;
pub mod models;
pub mod planning;
pub mod ratio;
pub mod report;
pub mod team;
pub mod tracker;
pub mod utils;
pub mod version;

#[cfg(test)]
pub mod test_utils;
