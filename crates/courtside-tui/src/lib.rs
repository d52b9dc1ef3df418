// Library root: exposes the terminal front end so the binary and tests can
// reach it.

pub mod tui;
