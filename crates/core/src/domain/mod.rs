pub mod article;
pub mod market;
