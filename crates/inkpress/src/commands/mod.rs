pub mod init;
pub mod serve;
pub mod summarize;
