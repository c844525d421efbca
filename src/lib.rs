pub mod config;
pub mod seeder;
pub mod verify;
pub mod writer;
