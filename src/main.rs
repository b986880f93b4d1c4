//! # file-organizer CLI
//!
//! Command-line interface for the file organizer.
//!
//! ## Usage
//! ```bash
//! file-organizer organize ~/Downloads ~/Sorted --strategy smart
//! file-organizer unorganize ~/Sorted ~/Flat --remove-empty --output json
//! ```

mod cli;

use file_organizer::Result;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    cli::run()
}
