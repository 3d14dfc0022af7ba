//! Manifest command - render configuration to YAML without a cluster

use std::path::Path;

use crate::context::{Context, load_config};
use crate::error::Result;
use crdform_kube::ManifestDataSource;

pub fn run(context: &Context, type_name: &str, file: &Path) -> Result<()> {
    let descriptor = context.descriptor(type_name)?;
    let config = load_config(&descriptor, file)?;

    let source = ManifestDataSource::new(descriptor);
    print!("{}", source.render(&config)?);
    Ok(())
}
