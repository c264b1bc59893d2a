pub mod interaction;
pub mod movement;
pub mod trails;
