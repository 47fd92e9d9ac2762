use std::process::exit;

use log::error;

use crate::workflow::recode_from_cmd;

mod cmd_args;
mod cmd_parsers;
mod workflow;

pub fn main()
{
    let cmd = cmd_args::create_cmd_args();
    let options = cmd.get_matches();

    cmd_parsers::setup_logger(&options);

    let parsed_opts = cmd_parsers::parse_options(&options);

    let result = recode_from_cmd(&options, parsed_opts);

    if result.is_err()
    {
        println!();
        error!(
            " Could not complete re-encode, reason {:?}",
            result.err().unwrap()
        );

        println!();
        exit(-1);
    }
}
