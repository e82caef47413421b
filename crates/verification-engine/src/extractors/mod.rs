pub mod numeric;

pub use numeric::{extract_indicators, find_in_text, parse_cell_number};
