pub mod synthetic_pattern;
