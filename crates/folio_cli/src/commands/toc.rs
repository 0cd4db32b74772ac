//! Table-of-contents command

use folio_book::render_toc;
use folio_cli::{run_validate, ValidateOutput};

use super::print_error_lines;
use crate::TocArgs;

pub fn run_toc(args: TocArgs) -> Result<i32, String> {
    let output: ValidateOutput = run_validate(args.source.into_input())?;
    let code = output.exit_code();
    match &output.result {
        Ok(manifest) => {
            for warning in &manifest.warnings {
                eprintln!("warning: {}", warning);
            }
            print!("{}", render_toc(manifest));
        }
        Err(errors) => {
            println!("status=failed");
            println!("errors={}", errors.len());
            print_error_lines(errors);
        }
    }
    Ok(code)
}
