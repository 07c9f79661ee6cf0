use std::error::Error;
use std::fs::File;
use std::io::Write;

use io4feeder::config::{path::get_schema_path, FeederConfig};
use schemars::schema_for;

fn main() -> Result<(), Box<dyn Error>> {
    let feeder_config_schema = schema_for!(FeederConfig);
    let mut file = File::create(get_schema_path())?;
    write!(
        file,
        "{}",
        serde_json::to_string_pretty(&feeder_config_schema)?
    )?;

    Ok(())
}
