// SPDX-License-Identifier: MPL-2.0
use iced_webcam::app::{self, Flags};
use tracing_subscriber::EnvFilter;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let flags = match Flags::from_args(pico_args::Arguments::from_env()) {
        Ok(flags) => flags,
        Err(err) => {
            eprintln!("iced_webcam: {err}");
            eprintln!(
                "usage: iced_webcam [--mirror] [--rotate left|right] [--format png|jpeg|webp] \
                 [--no-audio] [--deny] [--output-dir <dir>] [--config <dir>]"
            );
            std::process::exit(2);
        }
    };

    app::run(flags)
}
