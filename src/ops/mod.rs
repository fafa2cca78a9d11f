pub mod bar_ops;
pub mod chord_ops;
pub mod motions;
