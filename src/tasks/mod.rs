pub mod maintenance_loop;
pub mod shutdown_signal;
pub mod task_runner;
