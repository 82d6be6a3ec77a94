pub mod db;
pub mod images;
pub mod mail;
pub mod payment;
