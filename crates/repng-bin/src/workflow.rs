use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::time::Instant;

use clap::parser::ValueSource::CommandLine;
use clap::ArgMatches;
use log::{debug, info};
use repng_core::error::RecodeErrors;
use repng_core::{PngRecoder, RecodeOptions};

pub(crate) fn recode_from_cmd(
    args: &ArgMatches, options: RecodeOptions
) -> Result<(), RecodeErrors>
{
    let in_file = args.get_one::<OsString>("in").unwrap();
    let out_file = args.get_one::<OsString>("out").unwrap();

    if in_file == out_file
    {
        return Err(RecodeErrors::GenericStatic(
            "Input and output point to the same file"
        ));
    }

    if Path::new(out_file).exists() && args.value_source("all-yes") != Some(CommandLine)
    {
        return Err(RecodeErrors::Generic(format!(
            "Output file {out_file:?} exists, pass --yes to overwrite it"
        )));
    }

    debug!("Reading {:?}", in_file);

    let data = fs::read(in_file)
        .map_err(|err| RecodeErrors::Generic(format!("Could not read {in_file:?}, {err}")))?;

    info!("Read {} bytes from {:?}", data.len(), in_file);

    let start = Instant::now();

    let out = PngRecoder::new_with_options(&data, options).recode()?;

    let stop = Instant::now();

    info!("Finished re-encoding in {} ms", (stop - start).as_millis());

    fs::write(out_file, &out)
        .map_err(|err| RecodeErrors::Generic(format!("Could not write {out_file:?}, {err}")))?;

    info!("Wrote {} bytes to {:?}", out.len(), out_file);

    Ok(())
}
