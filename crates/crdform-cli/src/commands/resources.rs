//! Resources command - list the available resource types

use console::style;

use crate::context::Context;
use crate::error::Result;

pub fn run(context: &Context) -> Result<()> {
    println!(
        "{:<52} {:<32} {}",
        style("TYPE").bold(),
        style("API VERSION").bold(),
        style("KIND").bold()
    );
    for descriptor in context.catalog.iter() {
        println!(
            "{:<52} {:<32} {}",
            descriptor.type_name(),
            descriptor.api_version(),
            descriptor.kind
        );
    }
    Ok(())
}
