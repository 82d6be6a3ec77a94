pub mod password;
pub mod verify_token;
