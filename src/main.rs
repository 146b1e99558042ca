use anyhow::Result;
use std::path::PathBuf;
use survey_refine::utils::logging;
use survey_refine::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置（SURVEY_CONFIG 指定配置文件，环境变量覆盖文件）
    let config_path = std::env::var_os("SURVEY_CONFIG").map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config)?.run().await?;

    Ok(())
}
