pub mod password;
pub mod storage;
