//! Validate command implementation

use folio_book::{format_minutes, ErrorRecord};
use folio_cli::ValidateOutput;

use super::print_error_lines;
use crate::ValidateArgs;

pub fn run_validate(args: ValidateArgs) -> Result<i32, String> {
    let output = folio_cli::run_validate(args.source.into_input())?;

    if let (Some(out), Ok(manifest)) = (args.out.as_ref(), &output.result) {
        let json = serde_json::to_string_pretty(manifest)
            .map_err(|err| format!("json encode: {}", err))?;
        if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|err| format!("create {}: {}", parent.display(), err))?;
        }
        std::fs::write(out, json + "\n")
            .map_err(|err| format!("write {}: {}", out.display(), err))?;
        tracing::info!(out = %out.display(), "wrote manifest");
    }

    if args.json {
        print_json(&output)?;
    } else {
        print_text(&output);
    }
    Ok(output.exit_code())
}

fn print_json(output: &ValidateOutput) -> Result<(), String> {
    let value = match &output.result {
        Ok(manifest) => serde_json::json!({
            "status": "ok",
            "root": output.root,
            "files_scanned": output.files_scanned,
            "manifest": manifest,
        }),
        Err(errors) => {
            let records: Vec<ErrorRecord> = errors.iter().map(|e| e.to_record()).collect();
            serde_json::json!({
                "status": "failed",
                "root": output.root,
                "files_scanned": output.files_scanned,
                "errors": records,
            })
        }
    };
    let json = serde_json::to_string(&value).map_err(|err| format!("json encode: {}", err))?;
    println!("{}", json);
    Ok(())
}

fn print_text(output: &ValidateOutput) {
    match &output.result {
        Ok(manifest) => {
            println!("status=ok");
            println!("root={}", output.root.display());
            if let Some(source) = &output.config_source {
                println!("config={}", source.display());
            }
            println!("files_scanned={}", output.files_scanned);
            println!("parts={}", manifest.parts.len());
            println!("chapters={}", manifest.chapter_count);
            println!(
                "total_read_time={} ({})",
                manifest.total_read_time,
                format_minutes(manifest.total_read_time)
            );
            for part in &manifest.parts {
                let numbers: Vec<String> =
                    part.chapters.iter().map(|c| c.chapter.to_string()).collect();
                println!(
                    "part={} chapters={} read_time={}",
                    part.number,
                    numbers.join(","),
                    part.read_time
                );
            }
            println!("fingerprint={}", manifest.fingerprint);
            println!("warnings={}", manifest.warnings.len());
            for warning in &manifest.warnings {
                println!("warning {}", warning);
            }
        }
        Err(errors) => {
            println!("status=failed");
            println!("root={}", output.root.display());
            println!("files_scanned={}", output.files_scanned);
            println!("errors={}", errors.len());
            print_error_lines(errors);
        }
    }
}
