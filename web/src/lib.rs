use clap::Parser;
use wasm_bindgen::prelude::*;

mod audio;
mod canvas;
mod game;
mod guess;
mod settings;
mod source;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Base URL of the puzzle API
    #[arg(long, default_value = source::DEFAULT_API_BASE)]
    api: String,
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::{document, window};

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window()
        .location()
        .hash()
        .unwrap_or_else(|_| "".to_string());

    let args = Args::try_parse_from(location_hash.split(['#', '&'])).expect("Could not parse args");
    if let Some(log_level) = args.verbose.log_level() {
        console_log::init_with_level(log_level).expect("Error initializing logger");
    }
    log::debug!("api: {}", args.api);

    let root = document()
        .get_element_by_id("game")
        .expect("Could not find id=\"game\" element");

    log::debug!("App started");
    yew::Renderer::<game::GameView>::with_root_and_props(
        root,
        game::GameProps {
            api: args.api.into(),
        },
    )
    .render();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_args_parse() {
        let args = Args::try_parse_from("#-vv&--api=https://example.test/".split(['#', '&'])).unwrap();
        assert_eq!(args.api, "https://example.test/");
        assert_eq!(args.verbose.log_level(), Some(log::Level::Info));

        let args = Args::try_parse_from("".split(['#', '&'])).unwrap();
        assert_eq!(args.api, source::DEFAULT_API_BASE);
    }
}
