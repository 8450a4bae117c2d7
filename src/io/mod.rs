pub mod config_io;
pub mod data_dir;
pub mod recovery;
pub mod state;
pub mod storage;
