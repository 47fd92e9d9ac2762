/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use clap::parser::ValueSource;
use clap::ArgMatches;
use log::{info, Level};
use repng_core::RecodeOptions;

use crate::cmd_args::FilterOption;

/// Convert parsed arguments into re-encode options
pub fn parse_options(options: &ArgMatches) -> RecodeOptions
{
    let filter = *options.get_one::<FilterOption>("filter").unwrap();
    let level = *options.get_one::<u32>("level").unwrap();
    let idat_size = *options.get_one::<usize>("idat-size").unwrap();

    let width = *options.get_one::<usize>("max-width").unwrap();
    let height = *options.get_one::<usize>("max-height").unwrap();

    let mut confirm_crc = true;

    if options.value_source("no-crc") == Some(ValueSource::CommandLine)
    {
        info!("Disabling CRC confirmation");
        confirm_crc = false;
    }

    RecodeOptions::default()
        .set_filter(filter.to_filter_method())
        .set_level(level)
        .set_idat_size(idat_size)
        .set_max_width(width)
        .set_max_height(height)
        .set_confirm_crc(confirm_crc)
}

/// Set up logging options
pub fn setup_logger(options: &ArgMatches)
{
    let log_level;

    if *options.get_one::<bool>("debug").unwrap()
    {
        log_level = Level::Debug;
    }
    else if *options.get_one::<bool>("trace").unwrap()
    {
        log_level = Level::Trace;
    }
    else if *options.get_one::<bool>("warn").unwrap()
    {
        log_level = Level::Warn;
    }
    else if *options.get_one::<bool>("info").unwrap()
    {
        log_level = Level::Info;
    }
    else
    {
        log_level = Level::Warn;
    }

    simple_logger::init_with_level(log_level).unwrap();

    info!("Initialized logger");
    info!("Log level :{}", log_level);
}
