//! jsonld binary entry point.

fn main() {
    if let Err(err) = jsonld_cli::cli::run() {
        jsonld_cli::ui::output::report_failure(&err);
    }
}
