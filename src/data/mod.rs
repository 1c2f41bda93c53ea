pub mod columns;
pub mod loader;
pub mod normalize;
