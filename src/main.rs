use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thumbforge::engine::config::Config;
use thumbforge::rendering::font::load_required_font;
use thumbforge::rendering::{LayoutKind, Pipeline, PreviewState, RenderRequest, SourceLoader};
use thumbforge::repl::{parse_repl_input, ReplCommand};

const HELP: &str = "\
Commands:
  :layout <overlay|minimal|side-modern|centered>
  :title <text>         :date <text>         :author <text>
  :ref <book> <chapter>:<verse>[-<end>]
  @<path or data URL>   set the background image (bare @ removes it)
  :clear <title|ref|date|author|image>
  :export               write the thumbnail (needs author and reference)
  :status               show the current fields
  :h, :help             this text
  :q, :quit             exit";

/// Compose 1280×720 sermon thumbnails from the command line
#[derive(Parser, Debug)]
#[command(name = "thumbforge")]
#[command(version)]
struct Args {
    /// Regular font file, tried before the system font list
    #[arg(long)]
    font: Option<PathBuf>,

    /// Bold font file; without one bold text is emboldened
    #[arg(long)]
    bold_font: Option<PathBuf>,

    /// Directory exports are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Initial layout
    #[arg(short, long, default_value = "overlay")]
    layout: LayoutKind,
}

fn build_config(args: &Args) -> Config {
    let mut config = Config::default();
    config.font.custom_font_path = args.font.clone();
    config.font.bold_font_path = args.bold_font.clone();
    config.export.output_dir = args.out_dir.clone();
    config
}

fn print_status(request: &RenderRequest, pipeline: &Pipeline) {
    let show = |value: Option<&str>| value.unwrap_or("-").to_string();

    println!("layout:    {}", request.layout);
    println!("image:     {}", request.background_image.as_ref().map_or("-".to_string(), |s| s.to_string()));
    println!("title:     {}", show(request.title_text()));
    println!("reference: {}", request.reference.as_ref().map_or("-".to_string(), |r| r.to_string()));
    println!("date:      {}", show(request.date_text()));
    println!("author:    {}", show(request.author_text()));
    println!("preview:   {:?}", pipeline.state());
    if !request.can_export() {
        println!("Complete required fields to export (author, reference)");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    // explicitly named fonts must load
    for path in args.font.iter().chain(args.bold_font.iter()) {
        load_required_font(path)?;
    }
    let config = build_config(&args);
    let output_dir = config.export.output_dir.clone();

    let mut pipeline = Pipeline::new(config);
    if pipeline.state() == PreviewState::Unavailable {
        eprintln!("No usable font found; previews and exports are disabled. Pass --font <file>.");
    }

    let loader = SourceLoader::default();
    let mut request = RenderRequest::new(args.layout);
    pipeline.render_with(request.clone(), &loader);

    println!("thumbforge: type :h for help");
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = parse_repl_input(&line);
        if command.is_edit() {
            if command.apply(&mut request) {
                let state = pipeline.render_with(request.clone(), &loader);
                log::debug!("preview is {:?}", state);
            }
            continue;
        }

        match command {
            ReplCommand::Quit => break,
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Status => print_status(&request, &pipeline),
            ReplCommand::Export => match pipeline.export() {
                Ok(artifact) => match artifact.write_to_dir(&output_dir) {
                    Ok(path) => println!("Saved {}", path.display()),
                    Err(err) => eprintln!("Export failed: {}", err),
                },
                Err(err) => eprintln!("{}", err),
            },
            ReplCommand::Unknown(input) if input.is_empty() => {}
            ReplCommand::Unknown(input) => eprintln!("Unknown command: {} (:h for help)", input),
            _ => {}
        }
    }

    Ok(())
}
