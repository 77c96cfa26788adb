pub mod analyze;
pub mod render;
pub mod run;
