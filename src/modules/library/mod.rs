pub mod playlist;
pub mod scanner;
