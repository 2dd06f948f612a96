use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Camera Index (default 0)
    #[arg(short, long, default_value_t = 0)]
    pub cam_index: u32,

    /// Path to the cursor sprite image
    #[arg(long, default_value = "assets/crab.png")]
    pub cursor_image: String,

    /// List available cameras
    #[arg(long)]
    pub list: bool,
}
