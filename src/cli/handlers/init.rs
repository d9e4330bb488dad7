use std::path::PathBuf;

use crate::cli::commands::InitArgs;
use crate::io::dir;

/// Written to `.mindflow/config.toml` by `mf init`
const CONFIG_TEMPLATE: &str = r##"# mindflow configuration

[log]
# trace | debug | info | warn | error | off
# Overridden by the MINDFLOW_LOG environment variable.
level = "info"

[display]
# Trailing id characters shown in listings. Any unique suffix works as an id.
id_chars = 6
# Set to false to hide completed tasks (same as passing --open).
show_completed = true
"##;

pub fn cmd_init(args: InitArgs, root: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let root = match root {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let data_dir = dir::init_data_dir(&root, CONFIG_TEMPLATE, args.force)?;
    println!("initialized {}", data_dir.display());
    Ok(())
}
