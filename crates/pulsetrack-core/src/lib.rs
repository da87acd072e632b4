pub mod attribution;
pub mod command;
pub mod event;
pub mod fingerprint;
pub mod session;
pub mod visitor;
