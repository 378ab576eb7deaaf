pub mod password;
pub mod reference;
pub mod token;
