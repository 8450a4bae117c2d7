pub mod board;
pub mod gesture;
pub mod store;
pub mod task_ops;
pub mod timeline;
