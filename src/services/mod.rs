pub mod classifier;
pub mod evaluator;
pub mod insights;
pub mod quiz;
pub mod roadmap;
pub mod score_store;
