use log::*;

// ======================= Logger Initialization =======================
pub fn init_logger(max_level: LevelFilter) {
    // RUST_LOG 优先于代码里给的默认级别
    env_logger::builder()
        .filter_level(max_level)
        .parse_default_env()
        .init();
    info!("Logger initialized for {}.", std::env::consts::OS);
}
