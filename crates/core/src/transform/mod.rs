pub mod anonymizer;
pub mod gaussian;
pub mod pixelate;
