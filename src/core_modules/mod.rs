pub mod evaluation;
pub mod heatmap;
pub mod ink_mask;
pub mod morphology;
pub mod pixel;
pub mod region_counter;
pub mod utils;
