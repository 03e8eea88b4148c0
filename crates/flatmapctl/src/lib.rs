//! flatmapctl - command-line front end for the flatmap knowledge store

pub mod cli;
pub mod commands;
pub mod logging;
pub mod settings;
