pub mod pages;
pub mod steps;
pub mod world;
