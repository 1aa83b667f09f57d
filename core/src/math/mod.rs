pub mod power;

pub use power::PowerHelper;
