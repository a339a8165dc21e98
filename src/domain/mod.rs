// Domain module: linear models and the relaxation oracle contract

pub mod models;
pub mod relaxation_oracle;
pub mod value_objects;

pub use models::*;
pub use relaxation_oracle::*;
pub use value_objects::*;
