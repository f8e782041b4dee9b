pub mod db;
pub mod file;
pub mod postgres;

#[cfg(test)]
mod tests;
