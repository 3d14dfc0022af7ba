//! Import command - adopt an existing object into state

use crate::context::Context;
use crate::display;
use crate::error::Result;
use crdform_core::parse_import_id;
use crdform_kube::CrdResource;

pub async fn run(context: &Context, type_name: &str, id: &str, json: bool) -> Result<()> {
    let descriptor = context.descriptor(type_name)?;
    parse_import_id(id)?;

    let mut resource = CrdResource::new(descriptor.clone());
    resource.configure(context.provider().await?);

    let state = resource.import_state(id).await?;
    display::success("Imported", id);
    display::print_state(&descriptor, &state, json)
}
