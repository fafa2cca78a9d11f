pub mod bar;
pub mod config;
pub mod duration;
pub mod fret;
pub mod music;
pub mod range;
pub mod tablature;

pub use bar::*;
pub use config::*;
pub use duration::*;
pub use fret::*;
pub use range::*;
pub use tablature::*;
