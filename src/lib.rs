pub mod arena;
pub mod cli;
pub mod digits;
pub mod error;
pub mod eval;
pub mod printer;
pub mod reader;
pub mod repl;
pub mod symbols;
pub mod tape;
