pub mod callback;
pub mod pool;
pub mod simulator;
pub mod vehicle;
