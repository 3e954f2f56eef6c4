pub mod book;
pub mod db;
pub mod errors;
pub mod reader;
pub mod review;

#[cfg(test)]
mod tests;
