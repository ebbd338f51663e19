pub mod mime;
pub mod numeric;
