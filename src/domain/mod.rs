mod expense;
mod item;
mod money;
mod person;
mod settlement;

pub use expense::*;
pub use item::*;
pub use money::*;
pub use person::*;
pub use settlement::*;
