pub mod attendance;
pub mod company;
pub mod employee;
pub mod login_log;
pub mod translation;
