pub mod callback;
pub mod refresh;
