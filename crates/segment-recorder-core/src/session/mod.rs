mod builder;
mod controller;
mod listener;
mod status;

pub use {
    builder::SessionBuilder,
    controller::SessionController,
    listener::{PauseListener, StartListener},
    status::{Operation, SessionStatus},
};
