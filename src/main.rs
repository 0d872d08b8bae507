use env_logger::Env;
use student_scores::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let config = Config::from_env()?;
    student_scores::serve(config).await
}
