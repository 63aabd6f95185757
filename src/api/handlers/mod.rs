//! Request handlers.

mod home;
mod todos;

#[cfg(test)]
mod todos_test;

pub use home::*;
pub use todos::*;
