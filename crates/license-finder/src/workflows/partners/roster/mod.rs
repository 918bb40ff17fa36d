//! CSV in (candidate rosters) and CSV out (scored results).

mod export;
mod parser;

pub use export::{export_filename, export_rows, render_csv, ExportRow};
pub use parser::{parse_roster, RosterImportError, RosterRow, MAX_LINKS_PER_ROW, MAX_ROSTER_ROWS};
