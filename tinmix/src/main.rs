use log::LevelFilter;

mod app;
mod demo;
mod mix_loop;
mod tools;

fn main() -> anyhow::Result<()> {
    let demo = demo::Demo::new(std::env::args().nth(1));

    app::App::new(demo)
        .set_logger_max_level(LevelFilter::Info)
        .run()
}
