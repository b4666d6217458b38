pub mod archive;
pub mod convert;
pub mod converted;
pub mod info;
