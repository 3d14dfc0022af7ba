//! Apply command - server-side apply a configuration file

use std::path::Path;

use crate::context::{Context, load_config};
use crate::display;
use crate::error::Result;
use crdform_core::ID_ATTRIBUTE;
use crdform_kube::CrdResource;

pub async fn run(context: &Context, type_name: &str, file: &Path, json: bool) -> Result<()> {
    let descriptor = context.descriptor(type_name)?;
    let plan = load_config(&descriptor, file)?;

    let mut resource = CrdResource::new(descriptor.clone());
    resource.configure(context.provider().await?);

    display::progress("Applying", &descriptor.kind);
    let state = resource.create(&plan).await?;
    display::success(
        "Applied",
        state.get(ID_ATTRIBUTE).as_str().unwrap_or_default(),
    );

    display::print_state(&descriptor, &state, json)
}
