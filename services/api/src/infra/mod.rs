pub mod db;
pub mod pdf;
