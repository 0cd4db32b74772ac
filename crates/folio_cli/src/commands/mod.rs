//! Command implementations for folio

pub mod toc;
pub mod validate;

use folio_book::ValidationError;

/// One `error ...` line per validation error, in the order they were reported.
pub(crate) fn print_error_lines(errors: &[ValidationError]) {
    for err in errors {
        let record = err.to_record();
        println!(
            "error kind={} path={} message={}",
            record.kind.as_str(),
            record.path,
            record.message
        );
    }
}
