//! Schema command - print a resource descriptor

use crate::context::Context;
use crate::error::Result;

pub fn run(context: &Context, type_name: &str) -> Result<()> {
    let descriptor = context.descriptor(type_name)?;
    print!("{}", serde_yaml::to_string(&descriptor)?);
    Ok(())
}
