pub mod cli;
pub mod core;

pub fn init_logging() {
    // 测试里可能被多次调用，用 try_init 吞掉重复初始化
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp(None)
    .try_init();
}
