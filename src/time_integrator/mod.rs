pub mod fct;
pub mod schemes;
pub mod solver;
