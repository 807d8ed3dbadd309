pub mod fetch;
pub mod generate;
pub mod output;
