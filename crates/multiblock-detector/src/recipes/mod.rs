//! Pattern recipe implementations.

pub mod layered;
pub mod relative;
pub mod surround;
pub mod uniform;

pub use layered::LayeredRecipe;
pub use relative::RelativeUniformRecipe;
pub use surround::SurroundRecipe;
pub use uniform::UniformRecipe;
