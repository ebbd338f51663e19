pub mod dict;
pub mod image;
pub mod listing;
pub mod object;
pub mod table;

// Re-exports for callers
pub use dict::{Dict, JsonOptions};
pub use image::{Figure, RasterFigure};
pub use listing::{Enumerate, LenientListing, StrictListing};
pub use table::{ColumnData, ExportOutcome, Table, TableFormat};
