pub mod kpoint;
pub mod dielectric_function;
pub mod phonon_dos;
pub mod topology;

pub use kpoint::Kpoint;
pub use dielectric_function::DielectricFunction;
pub use phonon_dos::PhononDos;
pub use topology::Topology;
