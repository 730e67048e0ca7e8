//! Application pages.

mod compound;
mod home;
mod simulation;

pub use compound::CompoundPage;
pub use home::HomePage;
pub use simulation::SimulationPage;
