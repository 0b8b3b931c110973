//! CLI tool for listing the fillable fields of a PDF form template

use antenna_forms::{list_form_fields, FieldKind};
use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <pdf_template>", args[0]);
        eprintln!();
        eprintln!("Prints the fillable form fields of a PDF template.");
        process::exit(1);
    }

    match list_form_fields(&args[1]) {
        Ok(fields) => {
            println!("Found {} form fields:", fields.len());
            println!("{}", "=".repeat(60));
            for field in fields {
                let kind = match field.kind {
                    FieldKind::Text => "text",
                    FieldKind::Checkbox => "checkbox",
                    FieldKind::Choice => "choice",
                    FieldKind::Signature => "signature",
                    FieldKind::Other => "other",
                };
                match field.value {
                    Some(value) => println!("{} ({kind}) = {value:?}", field.name),
                    None => println!("{} ({kind})", field.name),
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
