mod task_runner;

pub use task_runner::{AsyncTaskRunner, Notification};
