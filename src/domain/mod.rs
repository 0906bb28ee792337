mod budget;
mod expense;
mod income;
mod money;

pub use budget::*;
pub use expense::*;
pub use income::*;
pub use money::*;
