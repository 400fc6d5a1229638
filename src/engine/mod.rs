pub mod density;
pub mod normalization;
pub mod renderer;
