pub mod cwl;
pub mod health;
