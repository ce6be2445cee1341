use anyhow::Context;
use clap::Parser;
use winit::event_loop::EventLoop;

use switch_mirror::app::App;
use switch_mirror::config::Args;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App::new(args);
    event_loop.run_app(&mut app).context("Event loop failed")?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
