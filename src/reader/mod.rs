//! Line reading: preprocessing and expression evaluation

mod expr;
mod lexer;

pub use expr::{read_expression, read_parameter_index, read_real_value};
pub use lexer::{preprocess_line, PreprocessedLine};
