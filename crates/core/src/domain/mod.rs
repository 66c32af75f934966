pub mod college;
pub mod comparison;
pub mod selection;
