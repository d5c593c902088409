use clap::Parser;
use redirect_report::{Config, Emails, Opts};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    redirect_report::util::tracing::init();

    let opts = Opts::parse();

    let config = Config::from_environment()?;
    let emails = Emails::from_environment(config.mail_from.clone())?;

    let mut stdout = std::io::stdout().lock();
    redirect_report::run(opts, &config, &emails, &mut stdout).await
}
