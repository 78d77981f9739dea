pub mod cache;
pub mod csv_parser;
pub mod source;
pub mod spreadsheet;
