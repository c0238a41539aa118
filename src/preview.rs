use anyhow::Result;
use log::info;

use crate::{cli::PreviewArgs, io_utils, table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let source = &args.source;
    let delimiter = io_utils::resolve_input_delimiter(&source.input, source.delimiter);
    let encoding = io_utils::resolve_encoding(source.input_encoding.as_deref())?;
    let store = io_utils::read_record_store(&source.input, delimiter, encoding)?;

    let rows = store
        .iter()
        .take(args.rows)
        .map(|record| record.fields().to_vec())
        .collect::<Vec<_>>();
    table::print_table(store.header(), &rows);
    println!("Number of rows: {}", store.len());
    println!("Number of columns: {}", store.arity());
    info!("Displayed {} row(s) from {:?}", rows.len(), source.input);
    Ok(())
}
