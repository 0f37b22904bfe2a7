use anyhow::Result;
use suitability::{FeatureStore, MemoryStore, io};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::FieldsArgs) -> Result<()> {
    let layer = io::read_layer(&args.input, args.id_column.as_deref())?;

    let mut store = MemoryStore::new();
    let source = store.add_layer(layer);

    for name in store.list_numeric_attribute_names(source)? {
        println!("{name}");
    }

    Ok(())
}
