pub mod types;
pub mod selection;
pub mod raw;
pub mod refine;
pub mod graph;
pub mod control;
pub mod settings;
pub mod commands;
pub mod cli;

pub use types::Result;

pub use cli::OptProcess;

pub use refine::{
    DielectricFunction,
    Kpoint,
    PhononDos,
    Topology,
};

pub use settings::Settings;
