use std::ffi::OsString;

use clap::builder::PossibleValue;
use clap::{value_parser, Arg, ArgAction, Command, ValueEnum};
use repng_core::FilterMethod;

static AFTER_HELP: &str = "Re-encodes a png file, rewriting the pixel data with a fixed \
scanline filter and a fresh zlib stream while carrying every other chunk through untouched";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum FilterOption
{
    None,
    Sub,
    Up,
    Average,
    Paeth
}

impl FilterOption
{
    pub const fn to_filter_method(self) -> FilterMethod
    {
        match self
        {
            Self::None => FilterMethod::None,
            Self::Sub => FilterMethod::Sub,
            Self::Up => FilterMethod::Up,
            Self::Average => FilterMethod::Average,
            Self::Paeth => FilterMethod::Paeth
        }
    }
}

impl ValueEnum for FilterOption
{
    fn value_variants<'a>() -> &'a [Self]
    {
        &[Self::None, Self::Sub, Self::Up, Self::Average, Self::Paeth]
    }

    fn to_possible_value(&self) -> Option<PossibleValue>
    {
        Some(match self
        {
            Self::None => PossibleValue::new("none"),
            Self::Sub => PossibleValue::new("sub"),
            Self::Up => PossibleValue::new("up"),
            Self::Average => PossibleValue::new("average"),
            Self::Paeth => PossibleValue::new("paeth")
        })
    }
}

#[rustfmt::skip]
pub fn create_cmd_args() -> Command {
    Command::new("repng")
        .after_help(AFTER_HELP)
        .version("0.1.0")
        .arg(Arg::new("in")
            .help("Input png file to read")
            .value_parser(value_parser!(OsString))
            .required(true))
        .arg(Arg::new("out")
            .help("Output file to write the re-encoded png to")
            .value_parser(value_parser!(OsString))
            .required(true))
        .arg(Arg::new("all-yes")
            .long("yes")
            .short('y')
            .help("Answer yes to all queries asked")
            .action(ArgAction::SetTrue))
        .args(add_logging_options())
        .args(add_settings())
}

fn add_logging_options() -> [Arg; 4]
{
    [
        Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .help_heading("Logging")
            .help("Display debug information and higher"),
        Arg::new("trace")
            .long("trace")
            .action(ArgAction::SetTrue)
            .help_heading("Logging")
            .help("Display very verbose information"),
        Arg::new("warn")
            .long("warn")
            .action(ArgAction::SetTrue)
            .help_heading("Logging")
            .help("Display warnings and errors"),
        Arg::new("info")
            .long("info")
            .action(ArgAction::SetTrue)
            .help_heading("Logging")
            .help("Display information about the re-encoding options")
    ]
}

fn add_settings() -> Vec<Arg>
{
    let mut args = [
        Arg::new("filter")
            .long("filter")
            .help_heading("Encode Settings")
            .help("Filter applied to every scanline written back out")
            .default_value("paeth")
            .value_parser(value_parser!(FilterOption)),
        Arg::new("level")
            .long("level")
            .help_heading("Encode Settings")
            .help("Zlib compression level for the emitted pixel data")
            .default_value("6")
            .value_parser(value_parser!(u32).range(0..=9)),
        Arg::new("idat-size")
            .long("idat-size")
            .help_heading("Encode Settings")
            .help("Maximum payload bytes of a single emitted IDAT chunk")
            .default_value("65536")
            .value_parser(value_parser!(usize)),
        Arg::new("max-width")
            .long("max-width")
            .help_heading("Image Settings")
            .help("Maximum width of images allowed")
            .default_value("131072")
            .value_parser(value_parser!(usize)),
        Arg::new("max-height")
            .long("max-height")
            .help_heading("Image Settings")
            .help("Maximum height of images allowed")
            .default_value("131072")
            .value_parser(value_parser!(usize)),
        Arg::new("no-crc")
            .long("no-crc")
            .help_heading("Image Settings")
            .help("Do not confirm chunk CRCs when parsing the input")
            .action(ArgAction::SetTrue)
    ];
    // list them in order
    args.sort_unstable_by(|x, y| x.get_id().cmp(y.get_id()));

    args.to_vec()
}

#[test]
fn verify_cli()
{
    create_cmd_args().debug_assert();
}
