//! Integration suites, grouped by the surface they drive.

mod cli;
mod session;
