//! Application logic for the converter CLI.
//!
//! This module contains the command runners separated from the main entry
//! point to enable testing.

mod convert;
mod helpers;
mod run;
mod types;

pub use convert::{convert_dialect, convert_format};
pub use helpers::{
    DEFAULT_TARGET, calculate_exit_code, create_output_options, export_file_name, load_scripts,
    read_script_input, resolve_workers, script_name, write_outputs
};
pub use run::{run_convert, run_probe, run_rules};
pub use types::{CommandOutput, ConvertParams, ProbeParams};
