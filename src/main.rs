//! Command-line meme compositor.
//!
//! Loads an image (file path, URL, or data URI), overlays top/bottom
//! captions, and writes a full-resolution PNG.

use std::process::ExitCode;

use memely::{MemeStore, Painter, fit_display};

struct Args {
    source: String,
    top: Option<String>,
    bottom: Option<String>,
    font_size: f32,
    color: String,
    out: String,
}

fn print_usage() {
    eprintln!(
        "usage: memely <image> [--top TEXT] [--bottom TEXT] \
         [--size PX] [--color #rrggbb] [--out FILE]"
    );
}

fn parse_args() -> Option<Args> {
    let mut args = std::env::args().skip(1);
    let mut source = None;
    let mut top = None;
    let mut bottom = None;
    let mut font_size = 48.0;
    let mut color = "#ffffff".to_string();
    let mut out = "meme.png".to_string();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--top" => top = Some(args.next()?),
            "--bottom" => bottom = Some(args.next()?),
            "--size" => font_size = args.next()?.parse().ok()?,
            "--color" => color = args.next()?,
            "--out" => out = args.next()?,
            "-h" | "--help" => return None,
            _ if source.is_none() => source = Some(arg),
            _ => return None,
        }
    }

    Some(Args {
        source: source?,
        top,
        bottom,
        font_size,
        color,
        out,
    })
}

fn run(args: &Args) -> memely::Result<()> {
    let mut store = MemeStore::new();
    store.load_image(&args.source)?;

    let image = store.image().expect("image just loaded");
    let (width, height) = fit_display(
        image.natural_width(),
        image.natural_height(),
        1280.0,
        720.0,
    );

    if let Some(text) = &args.top {
        let index = {
            store.add_text(
                width as f32 / 2.0,
                args.font_size,
                args.font_size,
                args.color.clone(),
            );
            store.len() - 1
        };
        store.update_text(index, memely::TextPatch::new().text(text.clone()))?;
    }
    if let Some(text) = &args.bottom {
        let index = {
            store.add_text(
                width as f32 / 2.0,
                height as f32 - args.font_size,
                args.font_size,
                args.color.clone(),
            );
            store.len() - 1
        };
        store.update_text(index, memely::TextPatch::new().text(text.clone()))?;
    }

    let painter = Painter::new()?;
    let png = painter.export_png(&store, width, height)?;
    std::fs::write(&args.out, png)?;
    log::info!("wrote {}", args.out);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(args) = parse_args() else {
        print_usage();
        return ExitCode::FAILURE;
    };

    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
