pub mod db;
pub mod records;
