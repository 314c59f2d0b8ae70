//! Output formatting: present counts as tables.
//!
//! - **LocTable**: Table-ready data structure with headers, rows, and footer
//! - **TableRow**: Individual row with label, display values and raw counts
//!
//! LocTable is pure data. Drawing it (plain, styled, JSON) is left to the
//! caller.
//!
//! ## Example
//!
//! ```rust,ignore
//! use locclib::output::LocTable;
//!
//! let table = LocTable::by_language(&outcome.languages());
//! // table.headers: ["Language", "Files", "Blank", "Comment", "Code", "Total"]
//! // table.rows: [TableRow { label: "Go", values: ["2", "15", ...], .. }]
//! // table.footer: TableRow { label: "Total (3 languages)", .. }
//! ```

pub mod table;

pub use table::{Grouping, LocTable, TableRow};
