use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use web_canvas_pro::{
    CanvasProOpts, LayerInputs, MAX_LAYERS, NODE_CLASS, NodeInputs, SessionStore, Tensor,
    WebCanvasNode,
    server::{self, AppState},
};

#[derive(Parser, Debug)]
#[command(name = "canvas-pro", version)]
struct Cli {
    /// JSON options file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the output root (artifacts go to `<root>/web_canvas_pro`).
    #[arg(long, global = true)]
    output_root: Option<PathBuf>,

    /// Override the listen address.
    #[arg(long, global = true)]
    bind: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the canvas endpoints (`/canvas_pro/save`, `/view`, `/ws`).
    Serve,
    /// Run one edit session against the local endpoints and write the outputs as PNGs.
    Run(RunArgs),
    /// Print the node's declared inputs and outputs as JSON.
    Schema,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Background PNG.
    #[arg(long)]
    back: PathBuf,

    /// First foreground PNG.
    #[arg(long)]
    fore: PathBuf,

    /// Mask PNG for the first foreground.
    #[arg(long)]
    fore_mask: Option<PathBuf>,

    /// Extra layer as `image.png[:mask.png]`; repeat for layers 2 to 10.
    #[arg(long = "layer")]
    layers: Vec<String>,

    /// Workflow metadata JSON holding the window id.
    #[arg(long, conflicts_with = "window_id")]
    workflow: Option<PathBuf>,

    /// Window id to route the dialog to (instead of `--workflow`).
    #[arg(long)]
    window_id: Option<String>,

    /// Keep this canvas: stable cache key and file names.
    #[arg(long, default_value_t = false)]
    keep_canvas: bool,

    /// Output directory for `image.png`, `mask.png` and `layer_mask_<n>.png`.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let opts = load_opts(&cli)?;
    match cli.cmd {
        Command::Serve => cmd_serve(opts),
        Command::Run(args) => cmd_run(opts, args),
        Command::Schema => {
            println!(
                "{}",
                serde_json::to_string_pretty(&web_canvas_pro::node_schema())?
            );
            Ok(())
        }
    }
}

fn load_opts(cli: &Cli) -> anyhow::Result<CanvasProOpts> {
    let mut opts = match &cli.config {
        Some(path) => CanvasProOpts::from_path(path)?,
        None => CanvasProOpts::default(),
    };
    if let Some(root) = &cli.output_root {
        opts.output_root = root.clone();
    }
    if let Some(bind) = &cli.bind {
        opts.bind = bind.clone();
    }
    opts.validate()?;
    Ok(opts)
}

fn cmd_serve(opts: CanvasProOpts) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    let state = AppState::new(SessionStore::new(), &opts);
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&opts.bind)
            .await
            .with_context(|| format!("bind '{}'", opts.bind))?;
        server::serve(listener, state).await?;
        Ok(())
    })
}

fn cmd_run(opts: CanvasProOpts, args: RunArgs) -> anyhow::Result<()> {
    let inputs = load_inputs(&args)?;

    let rt = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    let store = SessionStore::new();
    let state = AppState::new(Arc::clone(&store), &opts);
    let events = Arc::new(state.events.clone());
    let listener = rt
        .block_on(tokio::net::TcpListener::bind(&opts.bind))
        .with_context(|| format!("bind '{}'", opts.bind))?;
    rt.spawn(async move {
        if let Err(e) = server::serve(listener, state).await {
            tracing::error!(error = %e, "canvas endpoints stopped");
        }
    });

    let mut node = WebCanvasNode::new(NODE_CLASS, opts, store, events)?;
    let outputs = node.process(&inputs)?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;
    write_image(&outputs.image, &args.out.join("image.png"))?;
    write_mask(&outputs.mask, &args.out.join("mask.png"))?;
    for (i, mask) in outputs.layer_masks.iter().enumerate() {
        write_mask(mask, &args.out.join(format!("layer_mask_{}.png", i + 1)))?;
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn load_inputs(args: &RunArgs) -> anyhow::Result<NodeInputs> {
    let mut layers = LayerInputs::new(read_image(&args.back)?, read_image(&args.fore)?);
    if let Some(mask) = &args.fore_mask {
        layers = layers.with_foreground_mask(read_mask(mask)?);
    }
    if args.layers.len() > MAX_LAYERS - 1 {
        bail!("at most {} extra layers are supported", MAX_LAYERS - 1);
    }
    for (i, arg) in args.layers.iter().enumerate() {
        let (image, mask) = match arg.split_once(':') {
            Some((image, mask)) => (image, Some(mask)),
            None => (arg.as_str(), None),
        };
        let mask = mask.map(|m| read_mask(Path::new(m))).transpose()?;
        layers = layers.with_extra(i + 2, read_image(Path::new(image))?, mask)?;
    }

    let extra_pnginfo = match (&args.workflow, &args.window_id) {
        (Some(path), _) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read workflow '{}'", path.display()))?;
            serde_json::from_str(&text).context("parse workflow JSON")?
        }
        (None, Some(id)) => json!({
            "workflow": { "nodes": [{ "type": NODE_CLASS, "widgets_values": [args.keep_canvas, id] }] }
        }),
        (None, None) => json!({}),
    };

    Ok(NodeInputs {
        layers,
        keep_canvas: args.keep_canvas,
        extra_pnginfo,
    })
}

fn read_image(path: &Path) -> anyhow::Result<Tensor> {
    let img = image::open(path)
        .with_context(|| format!("open image '{}'", path.display()))?
        .to_rgb8();
    let (w, h) = img.dimensions();
    Ok(Tensor::from_u8(
        vec![1, h as usize, w as usize, 3],
        img.as_raw(),
    )?)
}

fn read_mask(path: &Path) -> anyhow::Result<Tensor> {
    let img = image::open(path)
        .with_context(|| format!("open mask '{}'", path.display()))?
        .to_luma8();
    let (w, h) = img.dimensions();
    Ok(Tensor::from_u8(vec![1, h as usize, w as usize], img.as_raw())?)
}

fn write_image(t: &Tensor, path: &Path) -> anyhow::Result<()> {
    let Some((h, w)) = t.spatial() else {
        bail!("cannot write tensor of shape {:?} as an image", t.shape());
    };
    image::save_buffer_with_format(
        path,
        &t.first_item_u8(),
        w as u32,
        h as u32,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn write_mask(t: &Tensor, path: &Path) -> anyhow::Result<()> {
    let Some((h, w)) = t.spatial() else {
        bail!("cannot write tensor of shape {:?} as a mask", t.shape());
    };
    image::save_buffer_with_format(
        path,
        &t.first_item_u8(),
        w as u32,
        h as u32,
        image::ColorType::L8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}
