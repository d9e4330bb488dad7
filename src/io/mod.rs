pub mod config_io;
pub mod dir;
pub mod kv;
pub mod lock;
pub mod recovery;
pub mod session;
