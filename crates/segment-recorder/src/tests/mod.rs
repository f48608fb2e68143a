mod app;
mod command_merger;
mod config;
mod console_handler;
mod session_event;
mod template;
