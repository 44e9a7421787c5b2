pub mod backup_file;
pub mod decode;
pub mod descriptor;
pub mod netsh;
pub mod profiles;
pub mod workflow;
