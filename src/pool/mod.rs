pub mod data_source;
pub mod swap;
pub mod tick_array;
pub mod whirlpool;
