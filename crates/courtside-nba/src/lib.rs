// Player data pipeline: money parsing, CSV, record mapping, statistics,
// color scales and the generic table renderer.

pub mod color;
pub mod columns;
pub mod compare;
pub mod csv_codec;
pub mod headers;
pub mod money;
pub mod predict;
pub mod record;
pub mod stats;
pub mod table;
pub mod teams;

pub use color::{CellColor, ColorMode, Palette};
pub use compare::CellValue;
pub use record::{IdGenerator, PlayerRecord};
pub use stats::{compute_stats, Range, StatsRange};
pub use table::{ColumnSpec, SortState, SortType, TableRow, TableSpec};
