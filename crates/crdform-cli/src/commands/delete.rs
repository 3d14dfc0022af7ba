//! Delete command - delete an object by namespace/name

use crate::context::Context;
use crate::display;
use crate::error::Result;
use crdform_core::{Attr, ID_ATTRIBUTE, TypedConfig, WAIT_FOR_DELETE_ATTRIBUTE, parse_import_id};
use crdform_kube::{CrdResource, DeleteOutcome};

pub async fn run(context: &Context, type_name: &str, id: &str, wait: bool) -> Result<()> {
    let descriptor = context.descriptor(type_name)?;
    parse_import_id(id)?;

    let state = TypedConfig::new()
        .with(ID_ATTRIBUTE, Attr::string(id))
        .with(WAIT_FOR_DELETE_ATTRIBUTE, wait);

    let mut resource = CrdResource::new(descriptor);
    resource.configure(context.provider().await?);

    display::progress("Deleting", id);
    match resource.delete(&state).await? {
        DeleteOutcome::Deleted => display::success("Deleted", id),
        DeleteOutcome::AlreadyGone => display::success("Already gone:", id),
    }
    Ok(())
}
