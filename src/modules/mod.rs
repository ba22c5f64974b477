pub mod classes;
pub mod health;
pub mod levels;
pub mod repository;
pub mod students;
pub mod tracks;
