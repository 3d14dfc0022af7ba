//! Read command - fetch an object by namespace/name

use crate::context::Context;
use crate::display;
use crate::error::Result;
use crdform_core::parse_import_id;
use crdform_kube::CrdDataSource;

pub async fn run(context: &Context, type_name: &str, id: &str, json: bool) -> Result<()> {
    let descriptor = context.descriptor(type_name)?;
    let (namespace, name) = parse_import_id(id)?;

    let source = CrdDataSource::new(descriptor.clone(), context.provider().await?);
    let state = source.read(&namespace, &name).await?;
    display::print_state(&descriptor, &state, json)
}
