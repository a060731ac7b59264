//! Terminal file picker used by `/add` when no path is given.

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::Path;

use hdlacq_dialog::FilePicker;

/// Prompts for a path on stdin.  An empty line cancels.
pub struct StdinPicker;

impl FilePicker for StdinPicker {
    fn pick_file(&mut self, title: &str, start_dir: &str, filter: &str) -> String {
        println!("{}", title.bold().underline());
        println!("  Directory : {}", start_dir.dimmed());
        println!("  Filter    : {}", filter.dimmed());
        print!("  Path (empty to cancel): ");
        io::stdout().flush().ok();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => resolve_choice(start_dir, &line),
            Err(_) => String::new(),
        }
    }
}

/// Turn the typed answer into the path handed to the dialog.
///
/// Relative answers are taken relative to `start_dir`; a blank answer is
/// the cancel value `""`.
pub(crate) fn resolve_choice(start_dir: &str, input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return String::new();
    }
    let path = Path::new(input);
    if path.is_absolute() || start_dir.is_empty() {
        input.to_string()
    } else {
        Path::new(start_dir).join(path).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_answer_cancels() {
        assert_eq!(resolve_choice("/data", "   \n"), "");
    }

    #[test]
    fn absolute_answer_is_kept() {
        assert_eq!(resolve_choice("/data", "/tmp/foo.xml\n"), "/tmp/foo.xml");
    }

    #[test]
    fn relative_answer_joins_start_dir() {
        assert_eq!(resolve_choice("/data/calib", "site.xml"), "/data/calib/site.xml");
        assert_eq!(resolve_choice("", "site.xml"), "site.xml");
    }
}
